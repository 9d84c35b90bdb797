//! Batch materialization: candidate IDs in, enriched records out.

use futures::future::try_join_all;
use tracing::{debug, trace};

use roster_store::{Value, placeholders};
use roster_types::UserId;

use crate::directory::{Directory, USER_SELECT};
use crate::error::Result;
use crate::types::UserRecord;

impl Directory {
    /// Expand an ID sequence into enriched records.
    ///
    /// The input is partitioned into fixed-size chunks to stay under
    /// per-query parameter limits, one joined fetch is issued per chunk,
    /// and all fetches run concurrently. Output preserves chunk order;
    /// within a chunk the store's natural return order applies, so
    /// callers must not assume output order matches input ID order.
    ///
    /// Any chunk failure fails the whole call — in-flight siblings are
    /// dropped, not awaited, and no partial result is returned. IDs with
    /// no matching row are simply absent from the output.
    pub(crate) async fn materialize(&self, ids: &[UserId]) -> Result<Vec<UserRecord>> {
        if ids.is_empty() {
            trace!("empty id batch, nothing to materialize");
            return Ok(Vec::new());
        }

        let chunk_size = self.config.chunk_size;
        debug!(
            ids = ids.len(),
            fetches = ids.len().div_ceil(chunk_size),
            "materializing id batch"
        );

        let chunks = try_join_all(ids.chunks(chunk_size).map(|chunk| self.fetch_chunk(chunk))).await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    async fn fetch_chunk(&self, chunk: &[UserId]) -> Result<Vec<UserRecord>> {
        let sql = format!(
            "{USER_SELECT} WHERE u.user_id IN ({})",
            placeholders(chunk.len())
        );
        let params: Vec<Value> = chunk.iter().map(|id| id.as_str().into()).collect();
        let rows = self.executor.fetch(&sql, &params).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(UserRecord::from_row(row)?);
        }
        Ok(records)
    }
}
