//! Configuration for the directory layer.

use std::time::Duration;

/// Default time-to-live for the cached user count.
pub const DEFAULT_COUNT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default number of IDs per materialization chunk.
/// Sized to stay under typical parameterized-query limits.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// How free-text fragments are matched against text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMatch {
    /// Case-insensitive substring containment (`LIKE '%frag%'`).
    #[default]
    Substring,
    /// The store's full-text match syntax. Applies to the goal and role
    /// name columns only; the rest always use substring matching.
    FullText,
}

/// Configuration for a [`Directory`](crate::Directory).
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// How long a cached user count stays servable.
    pub count_ttl: Duration,

    /// Maximum number of IDs bound into a single materialization query.
    pub chunk_size: usize,

    /// Matching mode for the full-text-capable columns.
    pub text_match: TextMatch,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            count_ttl: DEFAULT_COUNT_TTL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            text_match: TextMatch::default(),
        }
    }
}

impl DirectoryConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the count cache TTL.
    pub fn with_count_ttl(mut self, ttl: Duration) -> Self {
        self.count_ttl = ttl;
        self
    }

    /// Set the materialization chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the text matching mode.
    pub fn with_text_match(mut self, mode: TextMatch) -> Self {
        self.text_match = mode;
        self
    }
}
