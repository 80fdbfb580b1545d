use thiserror::Error;

use crate::constants::{INVALID_TOKEN_NOTICE, NOT_FOUND_NOTICE, TOKEN_CHECK_FAILED_NOTICE};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("could not parse {0}")]
    Parse(String),
    #[error("boss {key} not found")]
    NotFound { key: String },
    #[error("access denied: {0}")]
    Auth(AuthFailure),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidToken,
    LookupFailed,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::InvalidToken => f.write_str("token is not registered"),
            AuthFailure::LookupFailed => f.write_str("token lookup failed"),
        }
    }
}

impl TrackerError {
    /// Text shown to the user in a blocking notice.
    pub fn notice(&self) -> String {
        match self {
            TrackerError::Parse(value) => format!("Could not parse {value}"),
            TrackerError::NotFound { .. } => NOT_FOUND_NOTICE.to_string(),
            TrackerError::Auth(AuthFailure::InvalidToken) => INVALID_TOKEN_NOTICE.to_string(),
            TrackerError::Auth(AuthFailure::LookupFailed) => TOKEN_CHECK_FAILED_NOTICE.to_string(),
            TrackerError::Store(_) => "Something went wrong, please try again".to_string(),
        }
    }
}
