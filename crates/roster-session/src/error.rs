//! Error types for session operations.

use thiserror::Error;

use roster_store::StoreError;

/// Errors that can occur while reading or mutating sessions.
///
/// A missing session is not an error; lookups return `Option::None`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A store round trip failed. Propagated unmodified.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
