//! Error types for directory operations.

use thiserror::Error;

use roster_store::StoreError;

/// Errors that can occur while searching or sampling the directory.
///
/// Absent rows are not errors: lookups that match nothing return
/// `Option::None` or an empty `Vec`.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A store round trip failed. Propagated unmodified, no retries.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Sampling was requested against a zero-sized population.
    #[error("cannot sample from an empty user population")]
    EmptyPopulation,

    /// The store returned a result shape the query cannot produce.
    #[error("malformed store result: {0}")]
    MalformedResult(String),
}

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
