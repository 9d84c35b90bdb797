//! Session record type and row decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_store::{Result as StoreResult, Row};
use roster_types::{SessionId, UserId};

/// One login session.
///
/// The durable store owns the record; the mirror holds a volatile copy
/// that never outlives the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// The user this session belongs to. Current usage assumes at most
    /// one active session per user, but nothing here enforces it.
    pub user_id: UserId,

    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Decode a row from the session table.
    pub(crate) fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            session_id: SessionId::new(row.text("session_id")?),
            user_id: UserId::new(row.text("linked_user_id")?),
            created_at: row.timestamp("created_at")?,
        })
    }
}
