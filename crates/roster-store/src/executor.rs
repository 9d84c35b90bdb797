//! The query-executor trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// Async interface to the relational store.
///
/// Statements use positional `?` placeholders bound from `params` in
/// order. Implementations map engine-specific errors onto
/// [`StoreError`](crate::StoreError) and must tolerate independent calls
/// running concurrently — the directory layer fans out batch fetches.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a row-returning statement.
    async fn fetch(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a mutating statement, returning the affected-row count.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;
}

/// An executor that can be shared across tasks.
pub type SharedExecutor = Arc<dyn QueryExecutor>;

/// Build the placeholder list for an `IN (...)` clause.
///
/// Callers must not pass `n == 0`; an empty `IN ()` clause is invalid SQL
/// and the query layers short-circuit before reaching this point.
pub fn placeholders(n: usize) -> String {
    debug_assert!(n > 0, "IN () clause with no placeholders");
    let mut out = String::with_capacity(n * 3);
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}
