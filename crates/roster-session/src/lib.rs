//! Session records with a write-through in-memory mirror.
//!
//! Lookups scan the mirror before touching the durable store; creates
//! write through to the store first and only then update the mirror, so
//! a mirror entry never exists without a durable counterpart. Deletion
//! purges the mirror before the durable delete runs.
//!
//! The mirror is a deliberately unindexed list — session volume is
//! small and the linear scan is part of the observable behavior.

mod error;
mod store;
mod types;

pub use error::{Result, SessionError};
pub use roster_types::{SessionId, UserId};
pub use store::SessionStore;
pub use types::SessionRecord;
