//! Output rendering.
//!
//! Rows become a JSON array of objects. Nothing is written until the whole
//! array has been rendered, so a failure never leaves partial output behind.

use crate::config::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::models::ResultRow;
use std::io::Write;

/// Render rows as a JSON array.
pub fn render_rows(rows: &[ResultRow], format: OutputFormat) -> CliResult<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(rows),
        OutputFormat::Pretty => serde_json::to_string_pretty(rows),
    };
    rendered.map_err(|e| CliError::serialization(e.to_string()))
}

/// Render rows and write them, newline-terminated, to `out`.
pub fn write_rows<W: Write>(out: &mut W, rows: &[ResultRow], format: OutputFormat) -> CliResult<()> {
    let rendered = render_rows(rows, format)?;
    writeln!(out, "{rendered}")
        .and_then(|_| out.flush())
        .map_err(|e| CliError::serialization(format!("failed to write output: {e}")))
}
