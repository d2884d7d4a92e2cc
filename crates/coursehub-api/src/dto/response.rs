//! Response envelopes returned by the backend.

use serde::{Deserialize, Serialize};

use coursehub_core::error::AppError;
use coursehub_entity::notification::{NotificationRecord, RawNotification};
use coursehub_entity::user::UserIdentity;

/// Every backend response is wrapped in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the backend considers the call successful.
    pub success: bool,
    /// Payload, present on success for data-bearing endpoints.
    pub data: Option<T>,
    /// Human-readable status, usually only set on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Fail unless the backend reported success.
    pub fn into_success(self, operation: &str) -> Result<Self, AppError> {
        if self.success {
            Ok(self)
        } else {
            Err(AppError::external(format!(
                "{operation} rejected: {}",
                self.message.as_deref().unwrap_or("no message")
            )))
        }
    }

    /// Fail unless the backend reported success and sent a payload.
    pub fn into_data(self, operation: &str) -> Result<T, AppError> {
        self.into_success(operation)?
            .data
            .ok_or_else(|| AppError::external(format!("{operation} returned no data")))
    }
}

/// `data` of `GET /notifications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListData {
    /// The full notification list.
    #[serde(default)]
    pub notifications: Vec<RawNotification>,
    /// Server-side unread count, when provided.
    #[serde(default)]
    pub unread_count: Option<u64>,
}

/// A normalized notification list as handed to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSnapshot {
    /// Records with read state folded to a single flag.
    pub notifications: Vec<NotificationRecord>,
    /// Server-side unread count, when provided.
    pub unread_count: Option<u64>,
}

impl From<NotificationListData> for NotificationSnapshot {
    fn from(data: NotificationListData) -> Self {
        Self {
            notifications: data
                .notifications
                .into_iter()
                .map(NotificationRecord::from)
                .collect(),
            unread_count: data.unread_count,
        }
    }
}

/// `data` of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    /// Bearer token for subsequent calls.
    pub token: String,
    /// The signed-in account.
    pub user: UserIdentity,
}

/// `data` of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserData {
    /// The account the token belongs to.
    pub user: UserIdentity,
}

#[cfg(test)]
mod tests {
    use serde::de::IgnoredAny;

    use super::*;

    #[test]
    fn test_list_envelope_normalizes_records() {
        let body = serde_json::json!({
            "success": true,
            "data": {
                "notifications": [{"id": "n1", "read": false}, {"id": "n2", "read": true}],
                "unreadCount": 1
            }
        });
        let envelope: ApiEnvelope<NotificationListData> = serde_json::from_value(body).unwrap();

        let snapshot = NotificationSnapshot::from(envelope.into_data("list").unwrap());
        assert_eq!(snapshot.notifications.len(), 2);
        assert_eq!(snapshot.unread_count, Some(1));
        assert!(!snapshot.notifications[0].read);
        assert!(snapshot.notifications[1].read);
    }

    #[test]
    fn test_unsuccessful_envelope_is_external_error() {
        let envelope: ApiEnvelope<IgnoredAny> =
            serde_json::from_str(r#"{"success": false, "message": "Not allowed"}"#).unwrap();
        let err = envelope.into_success("mark read").unwrap_err();
        assert_eq!(err.kind, coursehub_core::error::ErrorKind::ExternalService);
        assert!(err.message.contains("Not allowed"));
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let envelope: ApiEnvelope<NotificationListData> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(envelope.into_data("list").is_err());
    }
}
