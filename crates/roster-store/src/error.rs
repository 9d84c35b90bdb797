//! Error types for store adapter operations.

use thiserror::Error;

/// Errors surfaced by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A statement failed to execute.
    #[error("query failed: {0}")]
    Query(String),

    /// A row was missing an expected column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A column held a value of an unexpected type.
    #[error("column {column} is not {expected}")]
    TypeMismatch {
        /// Column that was read.
        column: String,
        /// Type the caller asked for.
        expected: &'static str,
    },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
