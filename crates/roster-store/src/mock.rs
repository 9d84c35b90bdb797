//! A scriptable executor for testing purposes.
//!
//! Results are replayed in FIFO order, separately for `fetch` and
//! `execute`, and every call is recorded so tests can assert on round-trip
//! counts and bound parameters.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::executor::QueryExecutor;
use crate::row::Row;
use crate::value::Value;

/// Which executor method a recorded call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// A row-returning statement.
    Fetch,
    /// A mutating statement.
    Execute,
}

/// One recorded executor call.
#[derive(Debug, Clone)]
pub struct Call {
    /// Which method was invoked.
    pub kind: CallKind,
    /// The SQL template as received.
    pub sql: String,
    /// The bound parameters as received.
    pub params: Vec<Value>,
}

/// A mock executor for deterministic tests.
///
/// Queue results with [`push_rows`](MockExecutor::push_rows) /
/// [`push_affected`](MockExecutor::push_affected); calls made after a
/// queue is exhausted fail, which keeps test scripts honest about how
/// many round trips the code under test performs.
#[derive(Debug, Default)]
pub struct MockExecutor {
    fetches: Mutex<VecDeque<Result<Vec<Row>>>>,
    executes: Mutex<VecDeque<Result<u64>>>,
    log: Mutex<Vec<Call>>,
}

impl MockExecutor {
    /// Create a mock with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch result.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.fetches.lock().unwrap().push_back(Ok(rows));
    }

    /// Queue a failing fetch.
    pub fn push_fetch_error(&self, error: StoreError) {
        self.fetches.lock().unwrap().push_back(Err(error));
    }

    /// Queue a successful execute result.
    pub fn push_affected(&self, rows: u64) {
        self.executes.lock().unwrap().push_back(Ok(rows));
    }

    /// Queue a failing execute.
    pub fn push_execute_error(&self, error: StoreError) {
        self.executes.lock().unwrap().push_back(Err(error));
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    /// Total number of calls made.
    pub fn call_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Number of `fetch` calls made.
    pub fn fetch_count(&self) -> usize {
        self.count_kind(CallKind::Fetch)
    }

    /// Number of `execute` calls made.
    pub fn execute_count(&self) -> usize {
        self.count_kind(CallKind::Execute)
    }

    fn count_kind(&self, kind: CallKind) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.kind == kind)
            .count()
    }

    fn record(&self, kind: CallKind, sql: &str, params: &[Value]) {
        self.log.lock().unwrap().push(Call {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn fetch(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.record(CallKind::Fetch, sql, params);
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(StoreError::Query(
                    "MockExecutor: no more scripted fetch results".to_string(),
                ))
            })
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.record(CallKind::Execute, sql, params);
        self.executes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(StoreError::Query(
                    "MockExecutor: no more scripted execute results".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_results_replay_in_order() {
        let mock = MockExecutor::new();
        mock.push_rows(vec![Row::new().with("n", 1i64)]);
        mock.push_rows(vec![Row::new().with("n", 2i64)]);

        let first = mock.fetch("SELECT 1", &[]).await.unwrap();
        let second = mock.fetch("SELECT 2", &[]).await.unwrap();

        assert_eq!(first[0].integer("n").unwrap(), 1);
        assert_eq!(second[0].integer("n").unwrap(), 2);
        assert_eq!(mock.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_queue_fails() {
        let mock = MockExecutor::new();
        let result = mock.fetch("SELECT 1", &[]).await;
        assert!(matches!(result, Err(StoreError::Query(_))));
    }

    #[tokio::test]
    async fn test_calls_record_sql_and_params() {
        let mock = MockExecutor::new();
        mock.push_affected(1);

        mock.execute("DELETE FROM session WHERE linked_user_id = ?", &["u1".into()])
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].kind, CallKind::Execute);
        assert!(calls[0].sql.starts_with("DELETE FROM session"));
        assert_eq!(calls[0].params, vec![Value::Text("u1".to_string())]);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let mock = MockExecutor::new();
        mock.push_fetch_error(StoreError::Unavailable("connection reset".to_string()));

        let result = mock.fetch("SELECT 1", &[]).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
