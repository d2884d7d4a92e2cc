//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Mutex;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::KeyValueStorage;

/// Process-local storage, for tests and for sessions that should not
/// outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("Memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, set: &[(&str, &str)], remove: &[&str]) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("Memory storage lock poisoned"))?;
        for key in remove {
            entries.remove(*key);
        }
        for (key, value) in set {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }
}
