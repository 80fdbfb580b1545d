use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{FLAG_POLL_INTERVAL, TICK_INTERVAL};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub tick_interval_ms: u64,
    pub flag_poll_interval_ms: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            flag_poll_interval_ms: FLAG_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl GeneralSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn flag_poll_interval(&self) -> Duration {
        Duration::from_millis(self.flag_poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSettings {
    /// `RUST_LOG` style spec, e.g. `"info, boss_spawn_tracker=debug"`.
    pub spec: String,
    pub directory: Option<PathBuf>,
    pub rotate_over_bytes: u64,
    pub keep_files: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            spec: "info".to_string(),
            directory: None,
            rotate_over_bytes: 5 * 1024 * 1024,
            keep_files: 3,
        }
    }
}
