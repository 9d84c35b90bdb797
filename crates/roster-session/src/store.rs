//! The session store and its in-memory mirror.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use roster_store::{Row, SharedExecutor};
use roster_types::{SessionId, UserId};

use crate::error::Result;
use crate::types::SessionRecord;

/// Session store backed by the durable session table, fronted by an
/// unbounded in-memory mirror.
///
/// One instance per process, constructed at startup and shared by
/// reference. Concurrent lookups against a create or delete on the same
/// user are safe but may transiently observe stale mirror state; the
/// mirror is eventually, not linearly, consistent with the store.
pub struct SessionStore {
    executor: SharedExecutor,
    mirror: RwLock<Vec<SessionRecord>>,
}

impl SessionStore {
    /// Create a session store with an empty mirror.
    pub fn new(executor: SharedExecutor) -> Self {
        Self {
            executor,
            mirror: RwLock::new(Vec::new()),
        }
    }

    /// Create a session: durable insert first, then the mirror.
    ///
    /// If the insert fails the mirror is left untouched — no mirror
    /// entry may exist without a durable counterpart.
    pub async fn create(
        &self,
        session_id: SessionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        self.executor
            .execute(
                "INSERT INTO session (session_id, linked_user_id, created_at) VALUES (?, ?, ?)",
                &[session_id.as_str().into(), user_id.as_str().into(), now.into()],
            )
            .await?;

        let record = SessionRecord {
            session_id,
            user_id,
            created_at: now,
        };
        self.mirror.write().await.push(record.clone());
        trace!(session_id = %record.session_id, user_id = %record.user_id, "session created");
        Ok(record)
    }

    /// Find a user's session, mirror first.
    ///
    /// On a mirror miss the durable store is read; a durable hit is
    /// written back into the mirror so the next lookup is served from
    /// memory.
    pub async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<SessionRecord>> {
        {
            let mirror = self.mirror.read().await;
            if let Some(hit) = mirror.iter().find(|s| s.user_id == *user_id) {
                trace!(user_id = %user_id, "session mirror hit");
                return Ok(Some(hit.clone()));
            }
        }
        debug!(user_id = %user_id, "session mirror miss, reading store");

        let rows = self
            .executor
            .fetch(
                "SELECT session_id, linked_user_id, created_at FROM session \
                 WHERE linked_user_id = ? LIMIT 1",
                &[user_id.as_str().into()],
            )
            .await?;
        self.adopt(rows.first()).await
    }

    /// Find a session by its ID, mirror first.
    ///
    /// Same fallback and write-back policy as
    /// [`find_by_user_id`](Self::find_by_user_id).
    pub async fn find_by_session_id(&self, session_id: &SessionId) -> Result<Option<SessionRecord>> {
        {
            let mirror = self.mirror.read().await;
            if let Some(hit) = mirror.iter().find(|s| s.session_id == *session_id) {
                trace!(session_id = %session_id, "session mirror hit");
                return Ok(Some(hit.clone()));
            }
        }
        debug!(session_id = %session_id, "session mirror miss, reading store");

        let rows = self
            .executor
            .fetch(
                "SELECT session_id, linked_user_id, created_at FROM session \
                 WHERE session_id = ? LIMIT 1",
                &[session_id.as_str().into()],
            )
            .await?;
        self.adopt(rows.first()).await
    }

    /// Delete all of a user's sessions.
    ///
    /// The mirror is purged before the durable delete runs, so lookups
    /// racing this call already miss. If the durable delete then fails,
    /// the mirror has diverged (stale-absent) until a later lookup
    /// re-adopts the surviving row.
    pub async fn delete_for_user(&self, user_id: &UserId) -> Result<()> {
        {
            let mut mirror = self.mirror.write().await;
            let before = mirror.len();
            mirror.retain(|s| s.user_id != *user_id);
            trace!(user_id = %user_id, purged = before - mirror.len(), "mirror purged");
        }

        self.executor
            .execute(
                "DELETE FROM session WHERE linked_user_id = ?",
                &[user_id.as_str().into()],
            )
            .await?;
        debug!(user_id = %user_id, "sessions deleted");
        Ok(())
    }

    /// Number of sessions currently mirrored.
    pub async fn mirror_len(&self) -> usize {
        self.mirror.read().await.len()
    }

    /// Decode a durable row and write it back into the mirror.
    async fn adopt(&self, row: Option<&Row>) -> Result<Option<SessionRecord>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let record = SessionRecord::from_row(row)?;
        self.mirror.write().await.push(record.clone());
        trace!(session_id = %record.session_id, "durable session adopted into mirror");
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use roster_store::{MockExecutor, StoreError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn session_row(session_id: &str, user_id: &str) -> Row {
        Row::new()
            .with("session_id", session_id)
            .with("linked_user_id", user_id)
            .with("created_at", now())
    }

    #[tokio::test]
    async fn test_create_then_lookup_hits_the_mirror() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_affected(1);

        let store = SessionStore::new(mock.clone());
        store
            .create(SessionId::from("s1"), UserId::from("u1"), now())
            .await
            .unwrap();

        let found = store.find_by_user_id(&UserId::from("u1")).await.unwrap();
        assert_eq!(found.unwrap().session_id, SessionId::from("s1"));

        // The lookup never touched the store.
        assert_eq!(mock.fetch_count(), 0);
        assert_eq!(mock.execute_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_the_mirror_empty() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_execute_error(StoreError::Query("duplicate key".to_string()));

        let store = SessionStore::new(mock.clone());
        let result = store
            .create(SessionId::from("s1"), UserId::from("u1"), now())
            .await;

        assert!(result.is_err());
        assert_eq!(store.mirror_len().await, 0);
    }

    #[tokio::test]
    async fn test_durable_hit_is_written_back_into_the_mirror() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(vec![session_row("s1", "u1")]);

        let store = SessionStore::new(mock.clone());

        let first = store
            .find_by_session_id(&SessionId::from("s1"))
            .await
            .unwrap();
        assert!(first.is_some());
        assert_eq!(mock.fetch_count(), 1);

        // Second lookup is served from the mirror; no scripted result
        // remains, so a store read here would fail the test.
        let second = store
            .find_by_session_id(&SessionId::from("s1"))
            .await
            .unwrap();
        assert!(second.is_some());
        assert_eq!(mock.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_user_id_falls_through_and_adopts() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(vec![session_row("s2", "u2")]);

        let store = SessionStore::new(mock.clone());
        let found = store.find_by_user_id(&UserId::from("u2")).await.unwrap();

        assert_eq!(found.unwrap().user_id, UserId::from("u2"));
        assert_eq!(store.mirror_len().await, 1);
    }

    #[tokio::test]
    async fn test_miss_in_both_tiers_is_none() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(vec![]);

        let store = SessionStore::new(mock.clone());
        let found = store.find_by_user_id(&UserId::from("ghost")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_lookup_by_session_id_is_none() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_affected(1); // create
        mock.push_affected(1); // delete
        mock.push_rows(vec![]); // durable fallback after the delete

        let store = SessionStore::new(mock.clone());
        store
            .create(SessionId::from("s1"), UserId::from("u1"), now())
            .await
            .unwrap();
        store.delete_for_user(&UserId::from("u1")).await.unwrap();

        let found = store
            .find_by_session_id(&SessionId::from("s1"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_mirror_is_purged_even_when_durable_delete_fails() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_affected(1);
        mock.push_execute_error(StoreError::Unavailable("connection reset".to_string()));

        let store = SessionStore::new(mock.clone());
        store
            .create(SessionId::from("s1"), UserId::from("u1"), now())
            .await
            .unwrap();

        let result = store.delete_for_user(&UserId::from("u1")).await;
        assert!(result.is_err());
        // Stale-absent divergence: the mirror no longer has the row even
        // though the durable delete never landed.
        assert_eq!(store.mirror_len().await, 0);
    }

    #[tokio::test]
    async fn test_delete_only_purges_the_target_user() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_affected(1);
        mock.push_affected(1);
        mock.push_affected(1);

        let store = SessionStore::new(mock.clone());
        store
            .create(SessionId::from("s1"), UserId::from("u1"), now())
            .await
            .unwrap();
        store
            .create(SessionId::from("s2"), UserId::from("u2"), now())
            .await
            .unwrap();

        store.delete_for_user(&UserId::from("u1")).await.unwrap();

        assert_eq!(store.mirror_len().await, 1);
        let kept = store.find_by_user_id(&UserId::from("u2")).await.unwrap();
        assert_eq!(kept.unwrap().session_id, SessionId::from("s2"));
    }
}
