//! User record types and row decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_store::{Result as StoreResult, Row};
use roster_types::UserId;

/// An enriched user record.
///
/// Immutable snapshot of a user row at fetch time. The office and icon
/// names come from `LEFT JOIN`s and can be absent. `department_name`,
/// `skill_names` and `goal` are only populated on the sampling path;
/// search results leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user identifier.
    pub user_id: UserId,

    /// Display name.
    pub user_name: String,

    /// Phonetic sort key.
    pub kana: String,

    /// When the user joined.
    pub entry_date: DateTime<Utc>,

    /// Name of the user's office, if assigned.
    pub office_name: Option<String>,

    /// File name of the user's icon, if set.
    pub icon_file_name: Option<String>,

    /// Department the user belongs to. Sampling path only.
    pub department_name: Option<String>,

    /// Skills held by the user, without duplicates. Sampling path only.
    pub skill_names: Vec<String>,

    /// Free-text goal. Sampling path only.
    pub goal: Option<String>,
}

impl UserRecord {
    /// Decode a row produced by the joined user/office/icon select.
    pub(crate) fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            user_id: UserId::new(row.text("user_id")?),
            user_name: row.text("user_name")?.to_string(),
            kana: row.text("kana")?.to_string(),
            entry_date: row.timestamp("entry_date")?,
            office_name: row.opt_text("office_name")?,
            icon_file_name: row.opt_text("file_name")?,
            department_name: None,
            skill_names: Vec::new(),
            goal: None,
        })
    }
}
