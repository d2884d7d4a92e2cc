//! Delivery of the forced-logout side effect.

use serde::Serialize;

use crate::token::TokenRejection;

/// What the user is told when the session is force-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForcedLogout {
    /// Why the token was rejected.
    #[serde(serialize_with = "display")]
    pub reason: TokenRejection,
    /// One-shot message for the user.
    pub message: String,
    /// Where to send the user next.
    pub redirect_to: String,
    /// Log-safe suffix of the rejected token.
    pub token_fingerprint: String,
}

fn display<S: serde::Serializer>(reason: &TokenRejection, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Receives the forced-logout notice. Called at most once per invalidated
/// token, after the session has already been cleared.
pub trait ForcedLogoutHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Show the message and navigate away.
    fn on_forced_logout(&self, notice: &ForcedLogout);
}

/// Handler that only writes the notice to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLogoutHandler;

impl ForcedLogoutHandler for LoggingLogoutHandler {
    fn on_forced_logout(&self, notice: &ForcedLogout) {
        tracing::warn!(
            reason = %notice.reason,
            redirect_to = %notice.redirect_to,
            token = %notice.token_fingerprint,
            "{}",
            notice.message
        );
    }
}
