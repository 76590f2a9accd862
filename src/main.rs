//! db-json-query - Main entry point.
//!
//! Runs one query and prints the rows as a JSON array on stdout. Diagnostics
//! and logs go to stderr.

use db_json_query::config::Config;
use db_json_query::error::EXIT_SUCCESS;
use db_json_query::runner;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout is reserved for the result
    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse_args();

    init_tracing(&config);

    info!(
        encoding = %config.encoding,
        "Starting db-json-query v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut stdout = std::io::stdout().lock();
    match runner::run_to(&config, &mut stdout).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            debug!(kind = err.kind(), error = ?err, "Run failed");
            eprintln!("{}", err.diagnostic());
            ExitCode::from(err.exit_code())
        }
    }
}
