//! Local, network-free inspection of bearer tokens.
//!
//! The signature is never verified here; that is the backend's job. The
//! client only needs to know whether the token is well-formed and unexpired.

pub mod claims;
pub mod error;
pub mod inspect;

pub use claims::TokenClaims;
pub use error::TokenRejection;
pub use inspect::{decode_claims, inspect_token};
