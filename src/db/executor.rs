//! Query execution engine.
//!
//! One call opens the connection, runs a single statement, buffers every row
//! and closes the connection again, whichever way the query ends.

use crate::db::params::bind_text_params;
use crate::db::pool::{self, PoolGuard};
use crate::db::types::{column_names, row_to_result};
use crate::error::{CliError, CliResult};
use crate::models::{ConnectionTarget, QueryResult, QuerySpec, ResultRow};
use futures_util::TryStreamExt;
use sqlx::MySqlPool;
use std::time::Instant;
use tracing::{debug, info};

/// Query executor that handles database query execution.
#[derive(Debug, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    /// Create a new query executor.
    pub fn new() -> Self {
        Self
    }

    /// Connect to `target`, run `spec` and return every row.
    pub async fn execute(
        &self,
        target: &ConnectionTarget,
        spec: &QuerySpec,
    ) -> CliResult<QueryResult> {
        let guard = pool::connect(target).await?;
        self.execute_with(guard, spec).await
    }

    /// Run `spec` on an already opened connection, closing it afterwards.
    pub async fn execute_with(&self, guard: PoolGuard, spec: &QuerySpec) -> CliResult<QueryResult> {
        let start = Instant::now();
        let fetched = fetch_rows(guard.pool(), spec).await;
        guard.close().await;
        let (columns, rows) = fetched?;

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            columns = columns.len(),
            rows = rows.len(),
            execution_time_ms,
            "Query finished"
        );

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }
}

/// Stream the statement's rows into memory.
///
/// Without bind arguments the SQL goes out as a plain text-protocol query, so
/// statements that cannot be prepared still run.
async fn fetch_rows(
    pool: &MySqlPool,
    spec: &QuerySpec,
) -> CliResult<(Vec<String>, Vec<ResultRow>)> {
    debug!(
        sql = %spec.sql,
        params = spec.params.len(),
        "Executing query"
    );

    let mut stream = if spec.has_params() {
        bind_text_params(sqlx::query(&spec.sql), &spec.params).fetch(pool)
    } else {
        use sqlx::Executor;
        pool.fetch(spec.sql.as_str())
    };

    let mut columns = Vec::new();
    let mut rows = Vec::new();
    while let Some(row) = stream
        .try_next()
        .await
        .map_err(CliError::from_query_error)?
    {
        if rows.is_empty() {
            columns = column_names(&row);
            debug!(columns = ?columns, "Received first row");
        }
        rows.push(row_to_result(&row));
    }

    Ok((columns, rows))
}
