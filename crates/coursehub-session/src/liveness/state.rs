//! Liveness state machine types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::token::TokenRejection;

/// Where the monitor stands for the token currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessState {
    /// No token in the store.
    Idle,
    /// A token appeared and has not been checked yet.
    Armed,
    /// The token passed its most recent check.
    Valid,
    /// The token failed a check; terminal for that token value.
    Invalid,
}

impl std::fmt::Display for LivenessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Armed => write!(f, "armed"),
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Result of one call to [`check`](super::SessionLivenessMonitor::check).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No token is held; nothing to check.
    NoSession,
    /// The token is still inside its post-login grace period.
    Deferred,
    /// A check already ran less than one interval ago.
    Throttled,
    /// The token is structurally sound and unexpired.
    Valid {
        /// When it will expire.
        expires_at: DateTime<Utc>,
    },
    /// The token failed; the session was cleared and the forced-logout
    /// side effect fired.
    Invalidated {
        /// What was wrong with it.
        reason: TokenRejection,
    },
    /// The token had already been invalidated; nothing fired again.
    AlreadyInvalid,
}

impl CheckOutcome {
    /// Whether an actual validation ran.
    pub fn performed(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Invalidated { .. })
    }
}
