//! Error types for db-json-query.
//!
//! Every stage of the pipeline reports failures through [`CliError`]. All of
//! them are fatal: the error travels up to `main`, which prints a diagnostic
//! to stderr and picks the exit code.

use crate::input::USAGE;
use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for fatal pipeline errors.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for command-line misuse (same convention as clap).
pub const EXIT_USAGE: u8 = 2;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Expected at least {expected} arguments, got {actual}")]
    Usage { expected: usize, actual: usize },

    #[error("Failed to decode argument {position}: {message}")]
    InputDecode { position: usize, message: String },

    #[error("Invalid connection info: {message}")]
    ConfigParse { message: String },

    #[error("{message}")]
    ConfigValidation { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error(
        "Query failed: {message}{}",
        .sql_state.as_ref().map(|c| format!(" (SQLSTATE: {c})")).unwrap_or_default()
    )]
    Execution {
        message: String,
        /// e.g., "42000" for a syntax error
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Failed to serialize results: {message}")]
    Serialization { message: String },
}

impl CliError {
    /// Create a usage error.
    pub fn usage(expected: usize, actual: usize) -> Self {
        Self::Usage { expected, actual }
    }

    /// Create an argument decoding error. `position` is zero-based.
    pub fn input_decode(position: usize, message: impl Into<String>) -> Self {
        Self::InputDecode {
            position,
            message: message.into(),
        }
    }

    /// Create a connection-info parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    /// Create a validation error for a required field that is absent or null.
    pub fn missing_field(field: &str) -> Self {
        Self::ConfigValidation {
            message: format!("{field} is required"),
        }
    }

    /// Create a validation error with a custom message.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an execution error with optional SQL state.
    pub fn execution(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Execution { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Stable label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "usage",
            Self::InputDecode { .. } => "input_decode",
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::Connection { .. } => "connection",
            Self::Execution { .. } => "execution",
            Self::Serialization { .. } => "serialization",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Classify a driver failure raised while the statement runs.
    ///
    /// Once the connection is open every failure is reported as an execution
    /// error, keeping the transport hint.
    pub fn from_query_error(err: sqlx::Error) -> Self {
        match CliError::from(err) {
            CliError::Connection {
                message,
                suggestion,
            } => CliError::execution(message, None, suggestion),
            other => other,
        }
    }

    /// Text printed to stderr for this error.
    ///
    /// `Error: <message>`, then `Hint: <suggestion>` when there is one. Usage
    /// errors are followed by the usage text instead.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Usage { .. } => format!("Error: {self}\n\n{USAGE}"),
            _ => match self.suggestion().filter(|s| !s.is_empty()) {
                Some(suggestion) => format!("Error: {self}\nHint: {suggestion}"),
                None => format!("Error: {self}"),
            },
        }
    }

    /// True if the failure happened before any network activity.
    pub fn is_pre_connect(&self) -> bool {
        matches!(
            self,
            Self::Usage { .. }
                | Self::InputDecode { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
        )
    }
}

/// Convert sqlx errors to CliError.
///
/// Transport-level failures are reported as connection errors; everything the
/// server or the row decoder rejects is an execution error.
impl From<sqlx::Error> for CliError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => CliError::connection(
                msg.to_string(),
                "Check the host, port and credentials in the connection info",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                CliError::execution(
                    db_err.message(),
                    code,
                    "Check the SQL syntax, referenced objects and the number of bind arguments",
                )
            }
            sqlx::Error::PoolTimedOut => CliError::connection(
                "Timed out waiting for a database connection",
                "Check that the server is reachable",
            ),
            sqlx::Error::PoolClosed => {
                CliError::connection("Connection was already closed", "Run the command again")
            }
            sqlx::Error::Io(io_err) => CliError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => CliError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => CliError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnDecode { index, source } => CliError::execution(
                format!("Failed to decode column {}: {}", index, source),
                None,
                "Cast the column to a text type in the query",
            ),
            sqlx::Error::Decode(source) => CliError::execution(
                format!("Decode error: {}", source),
                None,
                "Cast the column to a text type in the query",
            ),
            other => CliError::execution(
                format!("Unexpected database error: {}", other),
                None,
                "Run the statement in a MySQL client to inspect the failure",
            ),
        }
    }
}

/// Result type alias for the whole pipeline.
pub type CliResult<T> = Result<T, CliError>;
