//! # formdeck
//!
//! Declarative HTML forms, a record table, and CRUD over local key-value
//! storage. The three pieces share no state; the caller wires them.
//!
//! ## Modules
//!
//! - [`form`]: `FieldRenderer`, renders field descriptors into a live form
//! - [`storage`]: `RecordStore` over a pluggable `StorageBackend`
//! - [`table`]: `TableRenderer`, draws records with Edit/Delete actions
//! - [`record`]: the `Record` and `UserId` types passed between them
//! - [`dom`]: the `Surface` port the renderers draw through, its in-memory
//!   `Document`, and a browser implementation behind the `web` feature
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use formdeck::dom::Document;
//! use formdeck::form::{FieldDescriptor, FieldRenderer, FieldType, FormCallbacks};
//! use formdeck::storage::{MemoryStorage, RecordStore};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let doc = Document::new();
//! let root = doc.create_element("div");
//! doc.set_attribute(root, "id", "form-root");
//! doc.append_child(doc.body(), root);
//!
//! let store = Rc::new(RefCell::new(RecordStore::new("people", MemoryStorage::new()).unwrap()));
//!
//! let sink = store.clone();
//! let callbacks = FormCallbacks::new().on_submit(move |record| {
//!     if let Err(e) = sink.borrow_mut().add(&record) {
//!         eprintln!("save failed: {}", e);
//!     }
//! });
//!
//! let fields = vec![
//!     FieldDescriptor::new(FieldType::Text, "name"),
//!     FieldDescriptor::new(FieldType::Submit, "save"),
//! ];
//! let form = FieldRenderer::new(&doc, "form-root", fields, callbacks).unwrap();
//!
//! doc.input_text(form.controls("name")[0], "Ada");
//! form.submit();
//! assert_eq!(store.borrow().len(), 1);
//! ```

pub mod config;
pub mod dom;
pub mod form;
pub mod record;
pub mod storage;
pub mod table;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig};

pub use dom::{Document, NodeId, Surface};

pub use form::{FieldDescriptor, FieldRenderer, FieldType, FormCallbacks, FormError, FormOptions, NoticeKind};

pub use record::{validate_records, Record, ShapeError, UserId};

pub use storage::{
    FileStorage, MemoryStorage, RecordStore, StorageBackend, StorageError, StoreError, StoreResult,
    StoreStats,
};

pub use table::{TableCallbacks, TableError, TableOptions, TableRenderer};
