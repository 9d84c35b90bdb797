//! User-directory search and caching layer.
//!
//! This crate resolves heterogeneous search criteria (name, phonetic
//! name, mail, department, role, office, skill, free-text goal) into
//! enriched user records fetched from a relational store, and keeps a
//! time-bounded cache of the total user count for random sampling.
//!
//! The pipeline: a [`SearchCriterion`] is resolved to a set of candidate
//! user IDs (possibly via a two-stage lookup), then the batch
//! materializer expands the IDs into [`UserRecord`]s with chunked,
//! concurrent fetches. All store access goes through the
//! [`QueryExecutor`](roster_store::QueryExecutor) seam.
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_directory::{Directory, SearchCriterion};
//!
//! let directory = Directory::new(executor);
//! let hits = directory
//!     .search(SearchCriterion::OfficeName("Osaka".into()))
//!     .await?;
//! ```

mod batch;
mod config;
mod count_cache;
mod criteria;
mod directory;
mod error;
mod sampler;
mod types;

pub use config::{DEFAULT_CHUNK_SIZE, DEFAULT_COUNT_TTL, DirectoryConfig, TextMatch};
pub use criteria::SearchCriterion;
pub use directory::Directory;
pub use error::{DirectoryError, Result};
pub use roster_types::UserId;
pub use sampler::SampleOptions;
pub use types::UserRecord;
