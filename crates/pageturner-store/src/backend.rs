//! # Key-Value Backends
//!
//! The storage primitive underneath the cart and credential stores: string
//! keys to string values, nothing more.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backend Implementations                            │
//! │                                                                         │
//! │  MemoryBackend                      FileBackend                        │
//! │  ─────────────                      ───────────                        │
//! │  HashMap behind a Mutex             one file per key in a directory    │
//! │  shared by clones (one process)     shared by processes on one host    │
//! │  optional byte quota (tests)        write = temp file + rename         │
//! │                                                                         │
//! │  Neither locks across writers. Last write wins.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Backend Trait
// =============================================================================

/// A string key-value store.
pub trait KeyValueBackend: Send + Sync {
    /// Returns the value under `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrites the value under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// Memory Backend
// =============================================================================

/// In-process backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    /// Creates an empty, unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes once the stored values would
    /// exceed `limit` bytes in total.
    pub fn with_quota(limit: usize) -> Self {
        MemoryBackend {
            entries: Arc::default(),
            quota_bytes: Some(limit),
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Internal("memory backend lock poisoned".into()))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.lock()?;

        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let size = others + value.len();
            if size > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// File Backend
// =============================================================================

/// Directory-backed store: key `cart` lives in `<dir>/cart`.
///
/// Writes land in a uniquely named temp file in the same directory and are
/// then renamed over the target, so a concurrent reader sees either the old
/// or the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens (and creates if needed) a store directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(FileBackend { dir })
    }

    /// The directory holding the keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));

        fs::write(&tmp, value).map_err(|e| StoreError::io(key, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(key, e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &dyn KeyValueBackend) {
        assert_eq!(backend.get("cart").unwrap(), None);

        backend.set("cart", "[]").unwrap();
        assert_eq!(backend.get("cart").unwrap().as_deref(), Some("[]"));

        backend.set("cart", "[1]").unwrap();
        assert_eq!(backend.get("cart").unwrap().as_deref(), Some("[1]"));

        backend.remove("cart").unwrap();
        assert_eq!(backend.get("cart").unwrap(), None);
        backend.remove("cart").unwrap();
    }

    #[test]
    fn test_memory_backend() {
        exercise(&MemoryBackend::new());
    }

    #[test]
    fn test_memory_clones_share_entries() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.set("token", "abc").unwrap();
        assert_eq!(b.get("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_memory_quota() {
        let backend = MemoryBackend::with_quota(8);
        backend.set("a", "1234").unwrap();
        backend.set("b", "1234").unwrap();

        let err = backend.set("c", "x").unwrap_err();
        assert!(err.is_quota());

        // Overwriting an existing key only counts the new value
        backend.set("a", "4321").unwrap();
    }

    #[test]
    fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("store")).unwrap();
        exercise(&backend);
    }

    #[test]
    fn test_file_backend_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("cart", "[]").unwrap();
        backend.set("token", "t").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }

    #[test]
    fn test_file_backend_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            backend.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(backend.get("").is_err());
    }
}
