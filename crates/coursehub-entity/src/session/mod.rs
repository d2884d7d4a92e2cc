//! Client session entity.

pub mod model;

pub use model::{Session, token_fingerprint};
