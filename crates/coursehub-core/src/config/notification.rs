//! Notification polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Notification polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether the agent polls notifications at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between timer-driven fetches, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Delay between a confirmed mutation and the reconciling fetch, in milliseconds.
    #[serde(default = "default_reconcile_delay")]
    pub reconcile_delay_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: default_poll_interval(),
            reconcile_delay_ms: default_reconcile_delay(),
        }
    }
}

impl NotificationConfig {
    /// Interval between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Delay before the reconciling fetch.
    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.reconcile_delay_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    30
}

fn default_reconcile_delay() -> u64 {
    500
}
