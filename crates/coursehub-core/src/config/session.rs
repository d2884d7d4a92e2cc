//! Session persistence and liveness configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session persistence and liveness-check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the JSON file holding the persisted session entries.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Minimum spacing between two token liveness checks, in seconds.
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval_seconds: u64,
    /// Grace period after a token appears before the first check, in seconds.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_seconds: u64,
    /// Route the user is sent to after a forced logout.
    #[serde(default = "default_login_route")]
    pub login_route: String,
    /// Message shown once when the session is force-ended.
    #[serde(default = "default_expired_message")]
    pub expired_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            liveness_interval_seconds: default_liveness_interval(),
            startup_delay_seconds: default_startup_delay(),
            login_route: default_login_route(),
            expired_message: default_expired_message(),
        }
    }
}

impl SessionConfig {
    /// Minimum spacing between liveness checks.
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_seconds)
    }

    /// Delay after a new token before it is first checked.
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_seconds)
    }
}

fn default_storage_path() -> String {
    "data/session.json".to_string()
}

fn default_liveness_interval() -> u64 {
    30
}

fn default_startup_delay() -> u64 {
    2
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_expired_message() -> String {
    "Session expired. Please login again.".to_string()
}
