//! Notification entities.

pub mod model;
pub mod wire;

pub use model::{NotificationRecord, RelatedCourse};
pub use wire::{RawNotification, RawRelatedCourse};
