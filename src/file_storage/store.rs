//! Key-value storage backends
//!
//! `FileStore` keeps one JSON document per key in a directory;
//! `MemoryStore` keeps them in process and can be switched off to simulate
//! storage that is full or blocked.

use super::{atomic_write, ensure_dir};
use crate::utils::lock_mutex_recover;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a storage backend.
///
/// Repositories log these and carry on; they never reach the chat flow.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Failed to read '{key}': {message}")]
    Read { key: String, message: String },

    #[error("Failed to write '{key}': {message}")]
    Write { key: String, message: String },
}

/// Durable string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ============================================================================
// File Store
// ============================================================================

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path backing `key`. Keys may not escape the data directory.
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Read {
                key: key.to_string(),
                message: format!("{:?}: {}", path, e),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        ensure_dir(&self.dir).map_err(StorageError::Unavailable)?;

        atomic_write(&path, value).map_err(|message| StorageError::Write {
            key: key.to_string(),
            message,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: format!("Failed to delete {:?}: {}", path, e),
        })
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-process storage for tests and throwaway sessions.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// A store on which every operation fails.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    /// Toggle simulated availability. Stored entries survive an outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        lock_mutex_recover(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(lock_mutex_recover(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        lock_mutex_recover(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        lock_mutex_recover(&self.entries).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("data"));

        assert_eq!(store.get("dashboard").unwrap(), None);
        store.set("dashboard", r#"{"a":1}"#).unwrap();
        assert_eq!(store.get("dashboard").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(temp_dir.path().join("data").join("dashboard.json").exists());

        store.remove("dashboard").unwrap();
        assert_eq!(store.get("dashboard").unwrap(), None);
        store.remove("dashboard").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        for key in ["", "../escape", "a/b", ".hidden", "white space"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
        assert!(store.key_path("cc-intelligence-dashboard-data").is_ok());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let store = MemoryStore::unavailable();
        assert!(matches!(store.get("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.set("k", "v"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.remove("k"), Err(StorageError::Unavailable(_))));

        store.set_available(true);
        store.set("k", "v").unwrap();
        assert_eq!(store.len(), 1);
    }
}
