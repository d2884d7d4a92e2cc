//! Session liveness monitoring.

pub mod handler;
pub mod monitor;
pub mod state;

pub use handler::{ForcedLogout, ForcedLogoutHandler, LoggingLogoutHandler};
pub use monitor::{LivenessConfig, SessionLivenessMonitor};
pub use state::{CheckOutcome, LivenessState};
