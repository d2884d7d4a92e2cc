//! The local notification cache and its pure transforms.

use serde::Serialize;

use coursehub_api::NotificationSnapshot;
use coursehub_entity::notification::NotificationRecord;

/// Notifications as last seen by this client, plus the unread counter.
///
/// Every transform here is synchronous and side-effect free; the poller
/// owns when they run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationCache {
    /// Records in server order.
    records: Vec<NotificationRecord>,
    /// Unread counter shown on the badge.
    unread_count: u64,
}

impl NotificationCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// All cached records.
    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    /// The unread counter.
    pub fn unread_count(&self) -> u64 {
        self.unread_count
    }

    /// Records rendered in the panel: only the unread ones.
    pub fn unread(&self) -> Vec<NotificationRecord> {
        self.records
            .iter()
            .filter(|r| r.is_unread())
            .cloned()
            .collect()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace everything with a server snapshot.
    ///
    /// The server's unread count wins when it sends one; otherwise the
    /// unread records are counted locally.
    pub fn replace(&mut self, snapshot: NotificationSnapshot) {
        let local = snapshot.notifications.iter().filter(|r| r.is_unread()).count() as u64;
        self.unread_count = snapshot.unread_count.unwrap_or(local);
        self.records = snapshot.notifications;
    }

    /// Drop all records and zero the counter.
    pub fn clear(&mut self) {
        self.records.clear();
        self.unread_count = 0;
    }

    /// Mark one record read. Returns `true` if it was unread before.
    ///
    /// The counter only moves when a record actually flips, and never
    /// goes below zero.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if record.read {
            return false;
        }
        record.read = true;
        self.unread_count = self.unread_count.saturating_sub(1);
        true
    }

    /// Mark every record read and zero the counter.
    pub fn mark_all_read(&mut self) {
        for record in &mut self.records {
            record.read = true;
        }
        self.unread_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            title: format!("title {id}"),
            message: String::new(),
            created_at: None,
            read,
            related_course: None,
        }
    }

    fn snapshot(records: Vec<NotificationRecord>, unread_count: Option<u64>) -> NotificationSnapshot {
        NotificationSnapshot {
            notifications: records,
            unread_count,
        }
    }

    #[test]
    fn test_replace_prefers_server_count() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(vec![record("n1", false), record("n2", true)], Some(1)));

        assert_eq!(cache.records().len(), 2);
        assert_eq!(cache.unread_count(), 1);
        let unread: Vec<String> = cache.unread().into_iter().map(|r| r.id).collect();
        assert_eq!(unread, vec!["n1".to_string()]);
    }

    #[test]
    fn test_replace_counts_locally_without_server_count() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(
            vec![record("n1", false), record("n2", false), record("n3", true)],
            None,
        ));
        assert_eq!(cache.unread_count(), 2);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(vec![record("n1", false)], None));
        cache.replace(snapshot(vec![record("n9", true)], None));

        assert_eq!(cache.records().len(), 1);
        assert_eq!(cache.records()[0].id, "n9");
        assert_eq!(cache.unread_count(), 0);
    }

    #[test]
    fn test_mark_read_decrements_once() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(vec![record("n1", false), record("n2", false)], None));

        assert!(cache.mark_read("n1"));
        assert_eq!(cache.unread_count(), 1);
        assert!(!cache.mark_read("n1"));
        assert_eq!(cache.unread_count(), 1);
        assert!(!cache.mark_read("missing"));
        assert_eq!(cache.unread_count(), 1);
    }

    #[test]
    fn test_mark_read_floors_at_zero() {
        let mut cache = NotificationCache::new();
        // Server says zero even though a record is unread.
        cache.replace(snapshot(vec![record("n1", false)], Some(0)));
        assert!(cache.mark_read("n1"));
        assert_eq!(cache.unread_count(), 0);
    }

    #[test]
    fn test_mark_all_read_empties_panel() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(vec![record("n1", false), record("n2", false)], Some(7)));

        cache.mark_all_read();
        assert_eq!(cache.unread_count(), 0);
        assert!(cache.unread().is_empty());
        assert_eq!(cache.records().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = NotificationCache::new();
        cache.replace(snapshot(vec![record("n1", false)], None));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.unread_count(), 0);
    }
}
