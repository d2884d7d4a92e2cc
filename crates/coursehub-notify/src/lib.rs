//! # coursehub-notify
//!
//! Locally cached view of the user's notifications, refreshed on a timer
//! while a session is held. Read-state mutations are applied to the cache
//! first and confirmed by a full refetch once the backend accepts them.

pub mod cache;
pub mod poller;

pub use cache::NotificationCache;
pub use poller::{NotificationPoller, PollerConfig};
