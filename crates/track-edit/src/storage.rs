//! Storage for saved edit logs.
//!
//! A single trait `StorageBackend` (string keys and values) and a `FileStorage`
//! implementation that keeps one JSON file holding a map of key -> value. Logs are
//! stored under the dataset identifier, so every dataset resumes its own session.
//!
//! The file is read once on open; every mutation writes the whole map back
//! synchronously.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Simple string key/value storage.
pub trait StorageBackend: Send + Sync {
    /// Store a string value for a key.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Serialize `value` as JSON and store it under `key`.
pub fn save_json_backend<T: Serialize>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    match serde_json::to_string(value) {
        Ok(s) => backend.set_string(key, &s),
        Err(e) => Err(StorageError::Json(e.to_string())),
    }
}

/// File-based storage: one JSON file which is a map of key -> string value.
pub struct FileStorage {
    /// Path to the backing JSON file.
    path: PathBuf,
    /// In-memory copy of key -> value
    inner: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Determine a good default storage file path for the current user.
    /// - On Windows: %APPDATA%/TrackEdit/storage.json
    /// - Else: $HOME/.config/track-edit/storage.json
    pub fn default_storage_path() -> PathBuf {
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return Path::new(&appdata).join("TrackEdit").join("storage.json");
        }

        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("track-edit")
                .join("storage.json");
        }

        // Fallback to current directory
        Path::new(".").join("track-edit-storage.json")
    }

    /// Open (or create) the storage file; `None` uses [`Self::default_storage_path`].
    pub fn new_with_path(path: Option<PathBuf>) -> StorageResult<Self> {
        let path = path.unwrap_or_else(Self::default_storage_path);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create storage parent directory: {}", e))
            })?;
        }

        let mut map = BTreeMap::new();
        if path.exists() {
            let s = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read storage file: {}", e)))?;
            if !s.trim().is_empty() {
                map = serde_json::from_str(&s).map_err(|e| {
                    StorageError::Json(format!("Failed to parse storage JSON: {}", e))
                })?;
            }
        }

        tracing::debug!(path = %path.display(), entries = map.len(), "Opened log storage");
        Ok(FileStorage {
            path,
            inner: Mutex::new(map),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_locked(&self, locked: &BTreeMap<String, String>) -> StorageResult<()> {
        let s = serde_json::to_string_pretty(locked).map_err(|e| StorageError::Json(e.to_string()))?;
        fs::write(&self.path, s).map_err(|e| StorageError::Io(format!("write failed: {}", e)))
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {:?}", e)))
    }
}

impl StorageBackend for FileStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self.lock()?;
        guard.insert(key.to_string(), value.to_string());
        self.flush_locked(&guard)
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self.lock()?;
        if guard.remove(key).is_some() {
            self.flush_locked(&guard)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new_with_path(Some(dir.path().join("storage.json"))).unwrap();

        assert_eq!(storage.get_string("trails.geojson").unwrap(), None);
        storage.set_string("trails.geojson", "[]").unwrap();
        assert_eq!(storage.get_string("trails.geojson").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.keys().unwrap(), vec!["trails.geojson".to_string()]);

        storage.remove("trails.geojson").unwrap();
        assert_eq!(storage.get_string("trails.geojson").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new_with_path(Some(path.clone())).unwrap();
        save_json_backend(&storage, "a.gpx", &vec![1, 2, 3]).unwrap();
        drop(storage);

        let reopened = FileStorage::new_with_path(Some(path)).unwrap();
        assert_eq!(reopened.get_string("a.gpx").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStorage::new_with_path(Some(path)),
            Err(StorageError::Json(_))
        ));
    }
}
