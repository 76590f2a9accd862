//! Connection management.
//!
//! A run uses exactly one connection: the pool is capped at one open
//! connection, keeps none warm, and recycles it after three minutes. The pool
//! is owned by a [`PoolGuard`] so it is closed on every exit path.

use crate::config::{Config, DEFAULT_CHARSET, MAX_CONNECTIONS, MIN_CONNECTIONS};
use crate::error::{CliError, CliResult};
use crate::models::ConnectionTarget;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::{debug, info, warn};

/// Build driver connect options for a validated target.
pub fn connect_options(target: &ConnectionTarget) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&target.host)
        .port(target.port)
        .username(&target.username)
        .charset(DEFAULT_CHARSET);

    if !target.password.is_empty() {
        options = options.password(&target.password);
    }
    if let Some(database) = &target.database {
        options = options.database(database);
    }
    options
}

/// Pool tuning for a one-shot invocation.
pub fn pool_options() -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .max_lifetime(Config::connection_max_lifetime())
        .acquire_timeout(Config::connect_timeout())
}

/// Open the single connection for this run.
pub async fn connect(target: &ConnectionTarget) -> CliResult<PoolGuard> {
    info!(
        connection = %target.masked(),
        server_level = target.is_server_level(),
        "Connecting to database"
    );

    let pool = pool_options()
        .connect_with(connect_options(target))
        .await
        .map_err(|e| CliError::connection(format!("{}", e), connection_suggestion(&e)))?;

    debug!("Connected successfully");
    Ok(PoolGuard::new(pool))
}

/// Pick a remediation hint from the driver error text.
fn connection_suggestion(error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    // Refused connections are retried until the acquire timeout expires
    if error_str.contains("connection refused") || error_str.contains("timed out") {
        return "Check that the MySQL server is running and accessible".to_string();
    }

    if error_str.contains("access denied") || error_str.contains("password") {
        return "Verify the username and password in the connection info".to_string();
    }

    if error_str.contains("unknown database") {
        return "Check that the database name exists".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or try disabling it".to_string();
    }

    if error_str.contains("failed to lookup address") || error_str.contains("name or service") {
        return "Check the host name in the connection info".to_string();
    }

    "Verify host, port and credentials in the connection info".to_string()
}

/// Owner of the run's connection pool.
///
/// Call [`PoolGuard::close`] when done. If the guard is dropped without it
/// (early return or panic), the pool is closed from a spawned task.
pub struct PoolGuard {
    pool: MySqlPool,
    closed: bool,
}

impl std::fmt::Debug for PoolGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolGuard")
            .field("pool", &self.pool)
            .field("closed", &self.closed)
            .finish()
    }
}

impl PoolGuard {
    fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            closed: false,
        }
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close the connection and wait for it to shut down.
    pub async fn close(mut self) {
        self.closed = true;
        self.pool.close().await;
        debug!("Connection closed");
    }
}

impl Drop for PoolGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let pool = self.pool.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    pool.close().await;
                });
                warn!("Connection closed via Drop - consider using explicit close()");
            }
            // No runtime left; dropping the last handle releases the socket
            Err(_) => drop(pool),
        }
    }
}
