//! Time-bounded cache of the total user count.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use roster_store::QueryExecutor;

use crate::error::{DirectoryError, Result};

#[derive(Debug, Clone, Copy)]
struct CountEntry {
    value: u64,
    expires_at: Instant,
}

/// Single-value TTL cache of `SELECT COUNT(*) FROM user`.
///
/// One instance per [`Directory`](crate::Directory); there is no
/// process-global state. The mutex only keeps the value/expiry pair
/// consistent — the refresh query deliberately runs outside it, so two
/// callers that both observe an expired entry both refresh and the last
/// write wins. Duplicate work, never a wrong answer for long.
#[derive(Debug)]
pub(crate) struct CountCache {
    ttl: Duration,
    entry: Mutex<Option<CountEntry>>,
}

impl CountCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// The cached count, refreshed through `executor` when stale.
    ///
    /// An entry whose expiry has passed is never served.
    pub(crate) async fn get(&self, executor: &dyn QueryExecutor) -> Result<u64> {
        if let Some(value) = self.fresh_value() {
            trace!(count = value, "serving cached user count");
            return Ok(value);
        }

        let rows = executor
            .fetch("SELECT COUNT(*) AS count FROM user", &[])
            .await?;
        let row = rows.first().ok_or_else(|| {
            DirectoryError::MalformedResult("count query returned no rows".to_string())
        })?;
        let value = row.integer("count")? as u64;

        let expires_at = Instant::now() + self.ttl;
        *self.entry.lock() = Some(CountEntry { value, expires_at });
        debug!(count = value, ttl_secs = self.ttl.as_secs(), "user count refreshed");

        Ok(value)
    }

    fn fresh_value(&self) -> Option<u64> {
        let guard = self.entry.lock();
        guard
            .as_ref()
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value)
    }
}
