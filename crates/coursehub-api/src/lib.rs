//! # coursehub-api
//!
//! Client side of the external CourseHub REST API. The backend is not part
//! of this workspace; this crate only speaks its envelope format.

pub mod client;
pub mod dto;
pub mod traits;

pub use client::HttpApiClient;
pub use dto::response::{ApiEnvelope, LoginData, NotificationSnapshot};
pub use traits::{AuthApi, NotificationApi};
