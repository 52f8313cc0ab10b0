//! Browser localStorage backend
//!
//! Only built with the `web` feature, for wasm32 targets.

use crate::storage::backend::{StorageBackend, DEFAULT_QUOTA_BYTES};
use crate::storage::error::{StorageError, StorageResult};
use wasm_bindgen::{JsCast, JsValue};

/// `window.localStorage` as a `StorageBackend`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Grab the current window's localStorage
    pub fn from_window() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }

    pub fn new(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(describe(&e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(|e| {
            let quota = e
                .dyn_ref::<web_sys::DomException>()
                .map(|ex| ex.name() == "QuotaExceededError")
                .unwrap_or(false);
            if quota {
                StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed: key.len() + value.len(),
                    // the browser does not report its budget
                    limit: DEFAULT_QUOTA_BYTES,
                }
            } else {
                StorageError::Backend(describe(&e))
            }
        })
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Backend(describe(&e)))
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(ex) = value.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", ex.name(), ex.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
