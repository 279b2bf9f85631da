//! Key/value storage the engine persists through.
//!
//! In the browser this is `localStorage`; elsewhere (and in tests) an
//! in-memory map.

use std::collections::HashMap;
use std::fmt;

/// Why a storage write failed.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// No storage backend is reachable (private mode, no window, ...).
    Unavailable,
    /// The backend rejected the write (quota exceeded, ...).
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Write(reason) => write!(f, "storage write failed: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

/// Opaque text storage under string keys.
pub trait Storage {
    /// Stored text, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. `fail_writes` simulates a full or missing backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write("writes disabled".into()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser `localStorage`. Looked up on every call so a backend that
/// appears or disappears mid-session is handled.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn backend() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::backend()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let backend = Self::backend().ok_or(StorageError::Unavailable)?;
        backend
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_get_missing_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn memory_set_then_get() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.set("k", "w").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("w"));
    }

    #[test]
    fn memory_failing_writes_keep_old_value() {
        let mut storage = MemoryStorage::with_entry("k", "old");
        storage.fail_writes = true;
        assert!(matches!(storage.set("k", "new"), Err(StorageError::Write(_))));
        assert_eq!(storage.get("k").as_deref(), Some("old"));
    }

    #[test]
    fn error_display() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage unavailable");
        assert_eq!(
            StorageError::Write("quota".into()).to_string(),
            "storage write failed: quota"
        );
    }
}
