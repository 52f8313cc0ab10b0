//! Record table
//!
//! `TableRenderer` draws a list of records as an HTML table and reports row
//! actions back to the caller, who decides what Edit and Delete mean.

pub mod error;
pub mod format;
pub mod renderer;

pub use error::{TableError, TableResult};
pub use format::{format_cell, format_header_name, header_columns, HIDDEN_COLUMNS};
pub use renderer::{TableCallbacks, TableOptions, TableRenderer};
