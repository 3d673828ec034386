//! Execution boundary.
//!
//! Rendering never touches a database. Once a fragment has been rendered, its
//! SQL and arguments are handed to a [`Runner`], which forwards them to a
//! real connection. Builders carry an optional runner (see `run_with`) and
//! report [`SqlError::RunnerNotSet`] when asked to execute without one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::value::Value;

/// Something that can execute rendered SQL.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction` and,
/// with the `pool` feature, pooled `deadpool_postgres::Client` objects.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64>;

    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>>;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`SqlError::NotFound`] if no rows are returned.
    async fn query_row(&self, sql: &str, args: &[Value]) -> SqlResult<Row> {
        self.query(sql, args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SqlError::not_found("Expected one row, got none"))
    }
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl Runner for tokio_postgres::Client {
    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
        let params = params(args);
        Ok(tokio_postgres::Client::execute(self, sql, &params).await?)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
        let params = params(args);
        Ok(tokio_postgres::Client::query(self, sql, &params).await?)
    }
}

#[async_trait]
impl<'a> Runner for tokio_postgres::Transaction<'a> {
    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
        let params = params(args);
        Ok(tokio_postgres::Transaction::execute(self, sql, &params).await?)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
        let params = params(args);
        Ok(tokio_postgres::Transaction::query(self, sql, &params).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
#[async_trait]
impl Runner for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
        let client: &tokio_postgres::Client = self;
        Runner::execute(client, sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        Runner::query(client, sql, args).await
    }
}

#[async_trait]
impl<R: Runner + ?Sized> Runner for Arc<R> {
    async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
        (**self).execute(sql, args).await
    }

    async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
        (**self).query(sql, args).await
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> SqlResult<Row> {
        (**self).query_row(sql, args).await
    }
}

/// A runner stored inside builder state.
#[derive(Clone)]
pub struct SharedRunner(Arc<dyn Runner>);

impl SharedRunner {
    pub fn new(runner: impl Runner + 'static) -> Self {
        SharedRunner(Arc::new(runner))
    }

    pub fn from_arc(runner: Arc<dyn Runner>) -> Self {
        SharedRunner(runner)
    }

    pub fn as_runner(&self) -> &dyn Runner {
        &*self.0
    }
}

impl fmt::Debug for SharedRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRunner").field(&"<dyn Runner>").finish()
    }
}

/// Await `future`, giving up after `timeout` if one is set.
///
/// Dropping the inner future cancels the request on the client side.
pub async fn with_timeout<T, F>(timeout: Option<Duration>, future: F) -> SqlResult<T>
where
    F: Future<Output = SqlResult<T>> + Send,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(target: "chainsql.sql", timeout = ?limit, "query timed out");
                Err(SqlError::Timeout(limit))
            }
        },
        None => future.await,
    }
}

fn prepare(fragment: &dyn Fragment, op: &'static str) -> SqlResult<(String, Vec<Value>)> {
    let (sql, args) = fragment.render()?;
    tracing::debug!(
        target: "chainsql.sql",
        op,
        param_count = args.len(),
        sql = %sql,
        "running statement"
    );
    Ok((sql, args))
}

/// Render `fragment` and execute it.
pub async fn exec_with(runner: &dyn Runner, fragment: &dyn Fragment) -> SqlResult<u64> {
    exec_with_timeout(runner, fragment, None).await
}

pub async fn exec_with_timeout(
    runner: &dyn Runner,
    fragment: &dyn Fragment,
    timeout: Option<Duration>,
) -> SqlResult<u64> {
    let (sql, args) = prepare(fragment, "execute")?;
    with_timeout(timeout, runner.execute(&sql, &args)).await
}

/// Render `fragment` and return all rows.
pub async fn query_with(runner: &dyn Runner, fragment: &dyn Fragment) -> SqlResult<Vec<Row>> {
    query_with_timeout(runner, fragment, None).await
}

pub async fn query_with_timeout(
    runner: &dyn Runner,
    fragment: &dyn Fragment,
    timeout: Option<Duration>,
) -> SqlResult<Vec<Row>> {
    let (sql, args) = prepare(fragment, "query")?;
    with_timeout(timeout, runner.query(&sql, &args)).await
}

/// Render `fragment` and return its first row.
pub async fn query_row_with(runner: &dyn Runner, fragment: &dyn Fragment) -> SqlResult<Row> {
    query_row_with_timeout(runner, fragment, None).await
}

pub async fn query_row_with_timeout(
    runner: &dyn Runner,
    fragment: &dyn Fragment,
    timeout: Option<Duration>,
) -> SqlResult<Row> {
    let (sql, args) = prepare(fragment, "query_row")?;
    with_timeout(timeout, runner.query_row(&sql, &args)).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::expr::expr;

    #[derive(Default)]
    struct Recorder {
        last: Mutex<Option<(String, Vec<Value>)>>,
    }

    #[async_trait]
    impl Runner for Recorder {
        async fn execute(&self, sql: &str, args: &[Value]) -> SqlResult<u64> {
            *self.last.lock().unwrap() = Some((sql.to_string(), args.to_vec()));
            Ok(1)
        }

        async fn query(&self, sql: &str, args: &[Value]) -> SqlResult<Vec<Row>> {
            *self.last.lock().unwrap() = Some((sql.to_string(), args.to_vec()));
            Ok(Vec::new())
        }
    }

    struct Stalled;

    #[async_trait]
    impl Runner for Stalled {
        async fn execute(&self, _sql: &str, _args: &[Value]) -> SqlResult<u64> {
            std::future::pending().await
        }

        async fn query(&self, _sql: &str, _args: &[Value]) -> SqlResult<Vec<Row>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_exec_forwards_rendered_sql() {
        let runner = Recorder::default();
        let n = exec_with(&runner, &expr("DELETE FROM t WHERE a = ?", [1]))
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            runner.last.lock().unwrap().clone(),
            Some(("DELETE FROM t WHERE a = ?".to_string(), vec![Value::Int(1)]))
        );
    }

    #[tokio::test]
    async fn test_query_row_without_rows_is_not_found() {
        let runner = Recorder::default();
        let err = query_row_with(&runner, &expr("SELECT 1", Vec::<Value>::new()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_render_error_skips_runner() {
        let runner = Recorder::default();
        let err = exec_with(&runner, &crate::predicate::lt().add("x", None::<i32>))
            .await
            .unwrap_err();
        assert!(matches!(err, SqlError::NullOperand(_)));
        assert!(runner.last.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_timeout() {
        let stmt = expr("SELECT pg_sleep(10)", Vec::<Value>::new());
        let err = exec_with_timeout(&Stalled, &stmt, Some(Duration::from_millis(10)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_arc_runner() {
        let runner = Arc::new(Recorder::default());
        let shared = SharedRunner::new(Arc::clone(&runner));
        exec_with(shared.as_runner(), &expr("SELECT ?", [1])).await.unwrap();
        assert!(runner.last.lock().unwrap().is_some());
    }
}
