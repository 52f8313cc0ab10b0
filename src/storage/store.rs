//! Record Store
//!
//! CRUD facade over one persisted key. The in-memory array always matches
//! the last successful persist:
//!
//! ```text
//! mutate memory → persist → ok:  notify(on_data_change, deep copy)
//!                         → err: roll back memory, return Err
//! ```

use crate::record::{validate_records, Record, UserId};
use crate::storage::backend::StorageBackend;
use crate::storage::error::{StorageError, StoreError, StoreResult};
use serde_json::Value;

/// Change listener; receives a fresh copy of the full record set
pub type DataChangeCallback = Box<dyn FnMut(Vec<Record>)>;

/// Size and count snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub record_count: usize,
    pub persisted_bytes: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} bytes persisted",
            self.record_count, self.persisted_bytes
        )
    }
}

/// Persistent ordered collection of records under one key
pub struct RecordStore<B: StorageBackend> {
    key: String,
    backend: B,
    records: Vec<Record>,
    on_data_change: Option<DataChangeCallback>,
}

impl<B: StorageBackend> RecordStore<B> {
    /// Create a store over `key` and load whatever is persisted there
    pub fn new(key: impl Into<String>, backend: B) -> StoreResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let mut store = Self {
            key,
            backend,
            records: Vec::new(),
            on_data_change: None,
        };
        store.load();
        Ok(store)
    }

    /// Builder method: register the change listener
    pub fn with_on_data_change(mut self, callback: impl FnMut(Vec<Record>) + 'static) -> Self {
        self.on_data_change = Some(Box::new(callback));
        self
    }

    pub fn set_on_data_change(&mut self, callback: impl FnMut(Vec<Record>) + 'static) {
        self.on_data_change = Some(Box::new(callback));
    }

    /// Re-read the persisted array, replacing the in-memory copy
    ///
    /// Missing, unreadable, malformed or wrongly shaped data all load as an
    /// empty store. Returns the number of records loaded.
    pub fn load(&mut self) -> usize {
        self.records = self.read_persisted();
        tracing::debug!("Loaded {} records from {:?}", self.records.len(), self.key);
        self.records.len()
    }

    fn read_persisted(&self) -> Vec<Record> {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read {:?}: {}", self.key, e);
                return Vec::new();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Stored data under {:?} is not valid JSON: {}", self.key, e);
                return Vec::new();
            }
        };

        match validate_records(value) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Stored data under {:?} has an invalid shape, resetting: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Append a copy of `record`
    pub fn add(&mut self, record: &Record) -> StoreResult<()> {
        self.records.push(record.clone());

        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        self.notify();
        Ok(())
    }

    /// Replace the first record whose `userId` matches `record`'s
    pub fn update(&mut self, record: &Record) -> StoreResult<()> {
        let id = record.user_id().ok_or_else(|| {
            tracing::error!("Update rejected: record has no userId");
            StoreError::MissingUserId
        })?;

        let idx = self
            .records
            .iter()
            .position(|r| r.has_user_id(&id))
            .ok_or_else(|| {
                tracing::error!("Update rejected: no record with userId {}", id);
                StoreError::NotFound(id.to_string())
            })?;

        let previous = std::mem::replace(&mut self.records[idx], record.clone());

        if let Err(e) = self.persist() {
            self.records[idx] = previous;
            return Err(e);
        }

        self.notify();
        Ok(())
    }

    /// Remove every record carrying `id`; returns how many went
    pub fn delete(&mut self, id: &UserId) -> StoreResult<usize> {
        if !self.records.iter().any(|r| r.has_user_id(id)) {
            tracing::error!("Delete rejected: no record with userId {}", id);
            return Err(StoreError::NotFound(id.to_string()));
        }

        let previous = self.records.clone();
        self.records.retain(|r| !r.has_user_id(id));
        let removed = previous.len() - self.records.len();

        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }

        self.notify();
        Ok(removed)
    }

    /// Copy of the first record carrying `id`
    pub fn find(&self, id: &UserId) -> Option<Record> {
        self.records.iter().find(|r| r.has_user_id(id)).cloned()
    }

    /// Copy of every record
    pub fn all(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Drop everything, in memory and persisted
    pub fn clear(&mut self) {
        self.records.clear();
        if let Err(e) = self.backend.remove_item(&self.key) {
            tracing::error!("Failed to remove {:?} from storage: {}", self.key, e);
        }
        self.notify();
    }

    /// Serialize the full set as pretty-printed JSON
    pub fn export_data(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Replace the full set with the records in `json`
    ///
    /// The payload must be an array of objects. On persist failure the
    /// previous records are restored.
    pub fn import_data(&mut self, json: &str) -> StoreResult<usize> {
        let value: Value = serde_json::from_str(json).map_err(|e| {
            tracing::error!("Import rejected: invalid JSON: {}", e);
            StoreError::from(e)
        })?;

        let incoming = validate_records(value).map_err(|e| {
            tracing::error!("Import rejected: {}", e);
            StoreError::from(e)
        })?;

        let count = incoming.len();
        let previous = std::mem::replace(&mut self.records, incoming);

        if let Err(e) = self.persist() {
            self.records = previous;
            return Err(e);
        }

        tracing::info!("Imported {} records into {:?}", count, self.key);
        self.notify();
        Ok(count)
    }

    /// Size of the persisted encoding in bytes, read raw
    pub fn size_bytes(&self) -> usize {
        match self.backend.get_item(&self.key) {
            Ok(raw) => raw.map(|s| s.len()).unwrap_or(0),
            Err(e) => {
                tracing::warn!("Could not read {:?} for sizing: {}", self.key, e);
                0
            }
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            record_count: self.records.len(),
            persisted_bytes: self.size_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn persist(&mut self) -> StoreResult<()> {
        let encoded = serde_json::to_string(&self.records)?;

        match self.backend.set_item(&self.key, &encoded) {
            Ok(()) => {
                tracing::debug!("Persisted {} records ({} bytes)", self.records.len(), encoded.len());
                Ok(())
            }
            Err(e @ StorageError::QuotaExceeded { .. }) => {
                tracing::warn!("Storage quota exceeded for {:?}: {}", self.key, e);
                Err(e.into())
            }
            Err(e) => {
                tracing::error!("Failed to persist {:?}: {}", self.key, e);
                Err(e.into())
            }
        }
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_data_change.as_mut() {
            callback(self.records.clone());
        }
    }
}

impl<B: StorageBackend> std::fmt::Debug for RecordStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("key", &self.key)
            .field("records", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::MemoryStorage;
    use crate::storage::error::StorageResult;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn employee(id: i64, name: &str) -> Record {
        Record::new()
            .with("userId", id)
            .with("name", name)
            .with("skills", json!(["rust", "sql"]))
    }

    fn create_test_store() -> RecordStore<MemoryStorage> {
        RecordStore::new("employees", MemoryStorage::new()).unwrap()
    }

    /// Backend whose writes can be switched off
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failing: bool,
    }

    impl StorageBackend for FlakyStorage {
        fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
            if self.failing {
                return Err(StorageError::Backend("disk on fire".to_string()));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> StorageResult<()> {
            if self.failing {
                return Err(StorageError::Backend("disk on fire".to_string()));
            }
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = RecordStore::new("  ", MemoryStorage::new()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyKey));
    }

    #[test]
    fn test_load_missing_corrupt_and_misshapen() {
        let mut storage = MemoryStorage::new();
        storage.set_item("bad_json", "{not json").unwrap();
        storage.set_item("not_array", "{\"a\":1}").unwrap();
        storage.set_item("nested", "[[1,2]]").unwrap();
        storage.set_item("good", "[{\"a\":1}]").unwrap();

        for key in ["missing", "bad_json", "not_array", "nested"] {
            let store = RecordStore::new(key, storage.clone()).unwrap();
            assert!(store.is_empty(), "{} should load empty", key);
        }

        let store = RecordStore::new("good", storage).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_then_find_returns_independent_copy() {
        let mut store = create_test_store();
        let record = employee(1, "Ada");
        store.add(&record).unwrap();

        let mut found = store.find(&UserId::from(1i64)).unwrap();
        assert_eq!(found, record);

        found.insert("name", "Mallory");
        assert_eq!(
            store.find(&UserId::from(1i64)).unwrap().get("name"),
            Some(&json!("Ada"))
        );
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        store.add(&employee(2, "Grace")).unwrap();

        let backend = store.backend().clone();
        let reopened = RecordStore::new("employees", backend).unwrap();
        assert_eq!(reopened.all(), store.all());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        store.add(&employee(2, "Grace")).unwrap();

        let updated = Record::new().with("userId", 1).with("name", "Ada L.");
        store.update(&updated).unwrap();

        assert_eq!(store.records()[0], updated);
        assert_eq!(store.records()[1].get("name"), Some(&json!("Grace")));
    }

    #[test]
    fn test_update_unknown_id_leaves_state() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        let before = store.all();
        let bytes_before = store.size_bytes();

        let err = store.update(&employee(99, "Nobody")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.update(&Record::new().with("name", "no id")).unwrap_err();
        assert!(matches!(err, StoreError::MissingUserId));

        assert_eq!(store.all(), before);
        assert_eq!(store.size_bytes(), bytes_before);
    }

    #[test]
    fn test_delete_removes_all_matches() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        store.add(&employee(2, "Grace")).unwrap();
        store.add(&employee(1, "Ada again")).unwrap();

        let removed = store.delete(&UserId::from(1i64)).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.find(&UserId::from(1i64)).is_none());
    }

    #[test]
    fn test_delete_unknown_id_leaves_encoding() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        let raw_before = store.backend().get_item("employees").unwrap();

        let err = store.delete(&UserId::from("1")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.backend().get_item("employees").unwrap(), raw_before);
    }

    #[test]
    fn test_persist_failure_rolls_back() {
        let mut store = RecordStore::new("employees", FlakyStorage::default()).unwrap();
        store.add(&employee(1, "Ada")).unwrap();
        store.backend_mut().failing = true;

        assert!(store.add(&employee(2, "Grace")).is_err());
        assert!(store.update(&employee(1, "Changed")).is_err());
        assert!(store.delete(&UserId::from(1i64)).is_err());
        assert!(store.import_data("[]").is_err());

        assert_eq!(store.all(), vec![employee(1, "Ada")]);
    }

    #[test]
    fn test_quota_failure_is_distinguished() {
        let mut store = RecordStore::new("employees", MemoryStorage::new().with_quota(64)).unwrap();
        store.add(&Record::new().with("userId", 1)).unwrap();

        let big = Record::new().with("userId", 2).with("bio", "x".repeat(100));
        let err = store.add(&big).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_change_callback_receives_copies() {
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let sink = seen.clone();
        let mut store =
            create_test_store().with_on_data_change(move |records| sink.borrow_mut().push(records.len()));

        store.add(&employee(1, "Ada")).unwrap();
        store.add(&employee(2, "Grace")).unwrap();
        let _ = store.delete(&UserId::from(7i64));
        store.delete(&UserId::from(1i64)).unwrap();
        store.clear();

        // failed delete did not notify
        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_no_notify_on_failed_persist() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut store = RecordStore::new("employees", FlakyStorage::default())
            .unwrap()
            .with_on_data_change(move |_| *counter.borrow_mut() += 1);

        store.backend_mut().failing = true;
        let _ = store.add(&employee(1, "Ada"));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_clear() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.size_bytes(), 0);
        assert_eq!(store.backend().get_item("employees").unwrap(), None);
    }

    #[test]
    fn test_clear_survives_backend_failure() {
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let sink = seen.clone();
        let mut store = RecordStore::new("employees", FlakyStorage::default())
            .unwrap()
            .with_on_data_change(move |records| sink.borrow_mut().push(records.len()));
        store.add(&employee(1, "Ada")).unwrap();
        store.add(&employee(2, "Grace")).unwrap();

        store.backend_mut().failing = true;
        store.clear();

        assert!(store.is_empty());
        assert_eq!(*seen.borrow(), vec![1, 2, 0]);
        // the persisted copy is left behind
        assert!(store.backend().inner.get_item("employees").unwrap().is_some());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();
        store
            .add(&Record::new().with("userId", "u-2").with("meta", json!({ "team": "core" })))
            .unwrap();
        let before = store.all();

        let exported = store.export_data().unwrap();
        assert!(exported.contains('\n'), "export is pretty-printed");

        let mut other = RecordStore::new("copy", MemoryStorage::new()).unwrap();
        assert_eq!(other.import_data(&exported).unwrap(), 2);
        assert_eq!(other.all(), before);
    }

    #[test]
    fn test_import_rejects_bad_payloads() {
        let mut store = create_test_store();
        store.add(&employee(1, "Ada")).unwrap();

        assert!(matches!(
            store.import_data("not json").unwrap_err(),
            StoreError::Serialization(_)
        ));
        assert!(matches!(
            store.import_data("[1, 2]").unwrap_err(),
            StoreError::InvalidShape(_)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_size_bytes_matches_encoding() {
        let mut store = create_test_store();
        assert_eq!(store.size_bytes(), 0);

        store.add(&employee(1, "Ada")).unwrap();
        let raw = store.backend().get_item("employees").unwrap().unwrap();
        assert_eq!(store.size_bytes(), raw.len());
        assert_eq!(store.stats().record_count, 1);
    }
}
