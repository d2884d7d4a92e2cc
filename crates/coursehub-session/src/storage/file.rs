//! JSON-file storage backend.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::traits::KeyValueStorage;

/// Stores entries as a single JSON object on disk.
///
/// Every commit rewrites the whole file through a temp file in the same
/// directory followed by a rename, so readers never see a partial write.
#[derive(Debug)]
pub struct FileStorage {
    /// Location of the JSON document.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a backend for the given path. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> AppResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read '{}'", self.path.display()),
                e,
            )),
        }
    }

    fn read_entries(&self) -> AppResult<BTreeMap<String, String>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(BTreeMap::new());
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Session file '{}' is corrupt", self.path.display()),
                e,
            )
        })
    }

    /// Entries to build the next write on. A corrupt document is replaced
    /// rather than blocking every future write.
    fn entries_for_commit(&self) -> AppResult<BTreeMap<String, String>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(BTreeMap::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Overwriting corrupt session file: {}",
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace '{}'", self.path.display()),
                e.error,
            )
        })?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::internal("Session file lock poisoned"))?;
        Ok(self.read_entries()?.remove(key))
    }

    fn commit(&self, set: &[(&str, &str)], remove: &[&str]) -> AppResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::internal("Session file lock poisoned"))?;

        let mut entries = self.entries_for_commit()?;
        for key in remove {
            entries.remove(*key);
        }
        for (key, value) in set {
            entries.insert((*key).to_string(), (*value).to_string());
        }

        self.write_entries(&entries)?;
        tracing::trace!(
            path = %self.path.display(),
            written = set.len(),
            removed = remove.len(),
            "Session file committed"
        );
        Ok(())
    }
}
