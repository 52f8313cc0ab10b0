//! Table renderer error types

use crate::record::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table container id must be a non-empty string")]
    EmptyContainerId,

    #[error("Table container element {0:?} not found")]
    ContainerNotFound(String),

    /// Data handed to `render_value` is not a list of records
    #[error("Invalid table data: {0}")]
    InvalidData(#[from] ShapeError),
}

/// Result type alias for table operations
pub type TableResult<T> = Result<T, TableError>;
