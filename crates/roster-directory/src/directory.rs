//! The directory facade and its direct entry points.

use tracing::debug;

use roster_store::SharedExecutor;
use roster_types::UserId;

use crate::config::DirectoryConfig;
use crate::count_cache::CountCache;
use crate::criteria::SearchCriterion;
use crate::error::Result;
use crate::types::UserRecord;

/// Joined select used by every path that returns [`UserRecord`]s.
pub(crate) const USER_SELECT: &str = r#"
SELECT u.user_id, u.user_name, u.kana, u.entry_date, o.office_name, f.file_name
FROM user u
LEFT JOIN office o ON u.office_id = o.office_id
LEFT JOIN file f ON u.user_icon_id = f.file_id
"#;

/// The user-directory search layer.
///
/// Constructed once at startup with the store executor and passed by
/// reference to whatever serves requests; the count cache lives inside
/// and there is no module-level state.
pub struct Directory {
    pub(crate) executor: SharedExecutor,
    pub(crate) config: DirectoryConfig,
    pub(crate) count_cache: CountCache,
}

impl Directory {
    /// Create a directory with the default configuration.
    pub fn new(executor: SharedExecutor) -> Self {
        Self::with_config(executor, DirectoryConfig::default())
    }

    /// Create a directory with an explicit configuration.
    pub fn with_config(executor: SharedExecutor, config: DirectoryConfig) -> Self {
        let count_cache = CountCache::new(config.count_ttl);
        Self {
            executor,
            config,
            count_cache,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Search for users matching one criterion.
    ///
    /// Resolves the criterion to candidate IDs, then materializes them in
    /// chunks. A user matching the predicate through several intermediate
    /// paths (two department memberships, say) appears once per path;
    /// output order does not follow candidate order across a chunk.
    pub async fn search(&self, criterion: SearchCriterion) -> Result<Vec<UserRecord>> {
        let ids = self.resolve(&criterion).await?;
        debug!(
            criterion = criterion.label(),
            candidates = ids.len(),
            "criterion resolved"
        );
        self.materialize(&ids).await
    }

    /// List users ordered by entry date, then phonetic name.
    pub async fn list_users(&self, limit: usize, offset: usize) -> Result<Vec<UserRecord>> {
        let sql = format!(
            "{USER_SELECT} ORDER BY u.entry_date ASC, u.kana ASC LIMIT ? OFFSET ?"
        );
        let rows = self
            .executor
            .fetch(&sql, &[limit.into(), offset.into()])
            .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            users.push(UserRecord::from_row(row)?);
        }
        Ok(users)
    }

    /// Look up one user by ID. Absent users are `None`, not an error.
    pub async fn user_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let sql = format!("{USER_SELECT} WHERE u.user_id = ?");
        let rows = self
            .executor
            .fetch(&sql, &[user_id.as_str().into()])
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(UserRecord::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Resolve a mail/password-hash pair to a user ID.
    ///
    /// Hashing happens upstream; this is an exact-match lookup and a
    /// wrong pair is simply `None`.
    pub async fn user_id_by_credentials(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<Option<UserId>> {
        let rows = self
            .executor
            .fetch(
                "SELECT user_id FROM user WHERE mail = ? AND password = ?",
                &[mail.into(), password_hash.into()],
            )
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(UserId::new(row.text("user_id")?))),
            None => Ok(None),
        }
    }

    /// Total user count, served from the TTL cache when fresh.
    pub async fn user_count(&self) -> Result<u64> {
        self.count_cache.get(self.executor.as_ref()).await
    }
}
