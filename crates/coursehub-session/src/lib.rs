//! # coursehub-session
//!
//! The process-wide session store and the monitor that force-ends the
//! session once its token can no longer be trusted.

pub mod liveness;
pub mod storage;
pub mod store;
pub mod token;

pub use liveness::{
    CheckOutcome, ForcedLogout, ForcedLogoutHandler, LivenessConfig, LivenessState,
    SessionLivenessMonitor,
};
pub use store::SessionStore;
pub use token::{TokenClaims, TokenRejection, inspect_token};
