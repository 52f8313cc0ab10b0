//! Storage error types
//!
//! Two layers: `StorageError` comes from a backend (the raw key-value
//! facility), `StoreError` from `RecordStore` operations built on top of it.

use crate::record::ShapeError;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing would exceed the backend's capacity
    #[error("Quota exceeded writing {key:?}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend cannot be reached (no window, storage disabled, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Capacity errors are reported apart from everything else
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Errors returned by `RecordStore` operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage key was empty at construction
    #[error("Storage key must be a non-empty string")]
    EmptyKey,

    /// Record has no `userId`
    #[error("Record has no userId")]
    MissingUserId,

    /// No record carries the requested `userId`
    #[error("No record with userId {0}")]
    NotFound(String),

    /// Data does not have the shape of a record array
    #[error("Invalid data shape: {0}")]
    InvalidShape(#[from] ShapeError),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend write failed; the mutation was rolled back
    #[error("Persist failed: {0}")]
    Persist(#[from] StorageError),
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::Persist(e) if e.is_quota_exceeded())
    }
}

/// Result type alias for backend operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
