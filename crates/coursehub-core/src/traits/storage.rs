//! Durable key-value storage trait.

use crate::result::AppResult;

/// Durable string storage that survives process restarts.
///
/// Calls are synchronous: a write has reached the backing medium by the
/// time it returns. A [`commit`](KeyValueStorage::commit) is atomic, either
/// every write and removal lands or none does.
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Read a single entry. Returns `None` when the key is absent.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write `set` entries and delete `remove` keys in one atomic step.
    /// Absent keys in `remove` are ignored.
    fn commit(&self, set: &[(&str, &str)], remove: &[&str]) -> AppResult<()>;
}
