//! Backend API seams.
//!
//! The poller and the CLI depend on these traits rather than on the HTTP
//! client so tests can substitute in-memory fakes.

use async_trait::async_trait;

use coursehub_core::result::AppResult;
use coursehub_entity::user::UserIdentity;

use crate::dto::response::{LoginData, NotificationSnapshot};

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange credentials for a token and user record.
    async fn login(&self, email: &str, password: &str) -> AppResult<LoginData>;

    /// Fetch the account the token belongs to.
    async fn current_user(&self, token: &str) -> AppResult<UserIdentity>;

    /// Tell the backend the token is being discarded.
    async fn logout(&self, token: &str) -> AppResult<()>;
}

/// Notification endpoints.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the full notification list.
    async fn list_notifications(&self, token: &str) -> AppResult<NotificationSnapshot>;

    /// Mark one notification as read.
    async fn mark_read(&self, token: &str, notification_id: &str) -> AppResult<()>;

    /// Mark every notification as read.
    async fn mark_all_read(&self, token: &str) -> AppResult<()>;

    /// Delete one notification.
    async fn delete_notification(&self, token: &str, notification_id: &str) -> AppResult<()>;
}
