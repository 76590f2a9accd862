//! The decode → configure → execute → render pipeline.

use crate::config::Config;
use crate::db::QueryExecutor;
use crate::error::CliResult;
use crate::format::write_rows;
use crate::input::decode_args;
use crate::models::{ConnectionInfo, ConnectionTarget, QueryResult, QuerySpec};
use std::io::Write;
use tracing::debug;

/// Everything needed to run the query, validated before any network access.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub target: ConnectionTarget,
    pub query: QuerySpec,
}

/// Decode the positional arguments and validate the connection info.
pub fn prepare(config: &Config) -> CliResult<Invocation> {
    let decoded = decode_args(&config.args, config.encoding)?;
    let target = ConnectionInfo::parse(&decoded.connection_info)?.validate()?;

    debug!(
        connection = %target.masked(),
        params = decoded.query.params.len(),
        "Connection info validated"
    );

    Ok(Invocation {
        target,
        query: decoded.query,
    })
}

/// Run the query described by `config` and return its rows.
pub async fn run(config: &Config) -> CliResult<QueryResult> {
    let invocation = prepare(config)?;
    QueryExecutor::new()
        .execute(&invocation.target, &invocation.query)
        .await
}

/// Run the query and write the rendered rows to `out`.
pub async fn run_to<W: Write>(config: &Config, out: &mut W) -> CliResult<()> {
    let result = run(config).await?;
    debug!(rows = result.row_count(), format = %config.format, "Rendering result");
    write_rows(out, &result.rows, config.format)
}
