//! Form builder error types

use crate::form::descriptor::FieldType;
use thiserror::Error;

/// Errors raised by `FieldRenderer`
#[derive(Error, Debug)]
pub enum FormError {
    #[error("Form container id must be a non-empty string")]
    EmptyContainerId,

    #[error("Form container element {0:?} not found")]
    ContainerNotFound(String),

    #[error("Form requires at least one field descriptor")]
    NoFields,

    #[error("No valid field descriptors remain after validation")]
    NoValidFields,

    /// Descriptor payload is not a list
    #[error("Field descriptors must be a list: {0}")]
    MalformedFields(String),

    /// Editing needs a record identity
    #[error("Form data has no userId")]
    MissingUserId,

    #[error("Form has been destroyed")]
    Destroyed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single descriptor was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("field key must be a non-empty string")]
    EmptyKey,

    #[error("field {key:?} of type {field_type} requires a non-empty options list")]
    MissingOptions { key: String, field_type: FieldType },

    #[error("field key {0:?} is already used")]
    DuplicateKey(String),

    #[error("{0}")]
    Unparseable(String),
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
