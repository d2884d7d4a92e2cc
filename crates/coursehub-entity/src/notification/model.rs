//! Canonical notification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire::{RawNotification, RawRelatedCourse};

/// A notification as held in the client cache.
///
/// Read state is a single canonical flag; the backend's alternate field
/// names are folded into it on ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Backend notification identifier.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// When the backend created it.
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the user has read it.
    pub read: bool,
    /// Course the notification is about, if any.
    pub related_course: Option<RelatedCourse>,
}

/// Course summary attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedCourse {
    /// Course identifier.
    pub id: Option<String>,
    /// Course name.
    pub name: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
}

impl NotificationRecord {
    /// Check if the notification is still unread.
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

impl From<RawNotification> for NotificationRecord {
    fn from(raw: RawNotification) -> Self {
        let read = raw.is_read_any();
        Self {
            id: raw.id,
            title: raw.title,
            message: raw.message,
            created_at: raw.created_at,
            read,
            related_course: raw.related_course.map(RelatedCourse::from),
        }
    }
}

impl From<RawRelatedCourse> for RelatedCourse {
    fn from(raw: RawRelatedCourse) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            thumbnail: raw.thumbnail,
        }
    }
}
