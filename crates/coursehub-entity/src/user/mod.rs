//! User identity entities.

pub mod model;
pub mod role;

pub use model::UserIdentity;
pub use role::UserRole;
