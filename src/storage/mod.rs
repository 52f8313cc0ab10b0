//! Formdeck Storage
//!
//! Persistence for records, split into a port and the store built on it:
//!
//! - **backend**: `StorageBackend` trait plus the in-memory implementation
//! - **file**: one-file-per-key backend for native hosts
//! - **web**: browser localStorage backend (feature `web`)
//! - **store**: `RecordStore`, the CRUD facade over one key
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! add/update/delete/import:
//!   Record(s) → in-memory Vec → JSON → StorageBackend::set_item
//!                              ↘ rollback on Err
//!
//! load:
//!   StorageBackend::get_item → JSON → shape check → Vec<Record> (or empty)
//! ```
//!
//! # Example
//!
//! ```rust
//! use formdeck::record::{Record, UserId};
//! use formdeck::storage::{MemoryStorage, RecordStore};
//!
//! let mut store = RecordStore::new("employees", MemoryStorage::new())?;
//! store.add(&Record::new().with("userId", 7).with("name", "Ada"))?;
//!
//! let ada = store.find(&UserId::from(7i64)).unwrap();
//! assert_eq!(ada.get("name").unwrap(), "Ada");
//! # Ok::<(), formdeck::storage::StoreError>(())
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod store;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use backend::{MemoryStorage, StorageBackend, DEFAULT_QUOTA_BYTES};
pub use error::{StorageError, StorageResult, StoreError, StoreResult};
pub use file::FileStorage;
pub use store::{DataChangeCallback, RecordStore, StoreStats};
#[cfg(feature = "web")]
pub use web::LocalStorage;
