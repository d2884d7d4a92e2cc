//! Reasons a token fails local inspection.

use chrono::{DateTime, Utc};
use thiserror::Error;

use coursehub_core::error::AppError;

/// Why a token was judged unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// Not exactly three dot-separated segments.
    #[error("token has {0} segments, expected 3")]
    SegmentCount(usize),
    /// The payload segment is not valid base64url.
    #[error("token payload is not valid base64: {0}")]
    PayloadEncoding(String),
    /// The payload decoded, but not to a JSON object.
    #[error("token payload is not a JSON object: {0}")]
    PayloadFormat(String),
    /// The payload has no numeric `exp` claim.
    #[error("token payload has no expiry")]
    MissingExpiry,
    /// The `exp` claim is not in the future.
    #[error("token expired at {expired_at}")]
    Expired {
        /// When the token stopped being valid.
        expired_at: DateTime<Utc>,
    },
}

impl TokenRejection {
    /// Whether the token was well-formed but simply too old.
    pub fn is_expiry(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

impl From<TokenRejection> for AppError {
    fn from(err: TokenRejection) -> Self {
        AppError::authentication(err.to_string())
    }
}
