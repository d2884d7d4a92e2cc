//! Request bodies sent to the backend.

use serde::Serialize;

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Plain-text password, sent over the configured transport.
    pub password: &'a str,
}

/// Body for the single-notification mutations (`read`, `DELETE`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdRequest<'a> {
    /// Target notification.
    pub notification_id: &'a str,
}
