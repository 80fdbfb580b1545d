use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::abstractions::RecordStore;
use crate::constants::TOKENS_PATH;
use crate::error::{AuthFailure, TrackerError};

/// Proof that an access token was verified. Required by every operation
/// that writes boss records; it can only be obtained from [`AccessGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCapability {
    _private: (),
}

impl EditorCapability {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

// characters the hosted store refuses in keys
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

pub struct AccessGate<RS: RecordStore> {
    store: Arc<RS>,
}

impl<RS: RecordStore> AccessGate<RS> {
    pub fn new(store: Arc<RS>) -> Self {
        Self { store }
    }

    /// A token unlocks editing only when `tokens/<token>` holds exactly
    /// `true`.
    pub fn verify(&self, entered: &str) -> Result<EditorCapability, TrackerError> {
        let token = entered.trim();

        if token.is_empty() || token.contains(FORBIDDEN_KEY_CHARS) {
            return Err(TrackerError::Auth(AuthFailure::InvalidToken));
        }

        let value = self
            .store
            .read_one(&format!("{TOKENS_PATH}/{token}"))
            .map_err(|err| {
                warn!("token lookup failed: {:?}", err);
                TrackerError::Auth(AuthFailure::LookupFailed)
            })?;

        match value {
            Some(Value::Bool(true)) => {
                info!("access granted");
                Ok(EditorCapability::new())
            }
            _ => Err(TrackerError::Auth(AuthFailure::InvalidToken)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    Dashboard,
    BossList,
}

/// Navigation state of one user session.
#[derive(Debug)]
pub struct Session {
    view: View,
    capability: Option<EditorCapability>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            view: View::Dashboard,
            capability: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn capability(&self) -> Option<&EditorCapability> {
        self.capability.as_ref()
    }

    pub fn show_dashboard(&mut self) -> View {
        self.view = View::Dashboard;
        self.view
    }

    /// Switches to the editing view. The token prompt only runs while the
    /// session is still locked; on failure the view does not change.
    pub fn show_boss_list<RS, F>(&mut self, gate: &AccessGate<RS>, prompt: F) -> Result<EditorCapability, TrackerError>
    where
        RS: RecordStore,
        F: FnOnce() -> Option<String>,
    {
        let capability = match &self.capability {
            Some(capability) => capability.clone(),
            None => {
                let entered = prompt().ok_or(TrackerError::Auth(AuthFailure::InvalidToken))?;
                let capability = gate.verify(&entered)?;
                self.capability = Some(capability.clone());
                capability
            }
        };

        self.view = View::BossList;

        Ok(capability)
    }
}
