//! Key-value storage port
//!
//! `RecordStore` talks to persistence only through `StorageBackend`, so the
//! same store logic runs against memory, files, or browser localStorage.

use crate::storage::error::{StorageError, StorageResult};
use std::collections::HashMap;

/// Default quota, matching the common 5 MB localStorage budget
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// A string key-value facility with localStorage semantics
pub trait StorageBackend {
    /// Read the raw string under `key`
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
}

/// In-memory backend with a byte quota (5 MB unless overridden)
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: cap the total size of keys plus values
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Builder method: drop the size cap
    pub fn unbounded(mut self) -> Self {
        self.quota = None;
        self
    }

    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// Total bytes used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.quota {
            let current = self.items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));

        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_default_quota_is_five_megabytes() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.quota(), Some(DEFAULT_QUOTA_BYTES));

        let err = storage.set_item("k", &"x".repeat(DEFAULT_QUOTA_BYTES)).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(storage.is_empty());

        let mut open = MemoryStorage::new().unbounded();
        open.set_item("k", &"x".repeat(DEFAULT_QUOTA_BYTES)).unwrap();
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let mut storage = MemoryStorage::new().with_quota(10);
        storage.set_item("k", "12345678").unwrap();
        // replacing the same key frees the old value first
        storage.set_item("k", "87654321").unwrap();

        let err = storage.set_item("k", "123456789X").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("87654321"));
    }
}
