//! Notification shapes as the backend sends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification exactly as received from `GET /notifications`.
///
/// Read state arrives under either `read` or `isRead`; both are kept here
/// and collapsed by [`RawNotification::is_read_any`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    /// Backend notification identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Short headline.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Read flag, first spelling.
    #[serde(default)]
    pub read: Option<bool>,
    /// Read flag, second spelling.
    #[serde(default)]
    pub is_read: Option<bool>,
    /// Related course summary.
    #[serde(default)]
    pub related_course: Option<RawRelatedCourse>,
}

impl RawNotification {
    /// True when either read-state spelling is true.
    pub fn is_read_any(&self) -> bool {
        self.read.unwrap_or(false) || self.is_read.unwrap_or(false)
    }
}

/// Related course summary as sent by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRelatedCourse {
    /// Course identifier.
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    /// Course name (some endpoints call it `title`).
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
}
