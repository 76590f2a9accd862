//! Configuration handling for db-json-query.
//!
//! Flags come from the command line or the environment; the positional
//! arguments carry the connection info, the SQL text and the bind arguments.

use clap::{Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Connection tuning for a one-shot invocation
pub const CONNECTION_MAX_LIFETIME_SECS: u64 = 180;
pub const MAX_CONNECTIONS: u32 = 1;
pub const MIN_CONNECTIONS: u32 = 0;
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Transport encoding of the positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArgEncoding {
    /// Every argument is standard base64 (safe for quotes and whitespace)
    #[default]
    Base64,
    /// Arguments are taken verbatim as split by the shell
    Raw,
}

impl std::fmt::Display for ArgEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Rendering of the JSON result written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON array (default)
    #[default]
    Json,
    /// Indented JSON array
    Pretty,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for db-json-query.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-json-query",
    about = "Run one parameterized SQL query against MySQL and print the rows as JSON",
    version,
    author
)]
pub struct Config {
    /// Encoding of the positional arguments
    #[arg(
        short,
        long,
        value_enum,
        default_value = "base64",
        env = "DBQ_ARG_ENCODING"
    )]
    pub encoding: ArgEncoding,

    /// Output format
    #[arg(
        short,
        long,
        value_enum,
        default_value = "json",
        env = "DBQ_OUTPUT_FORMAT"
    )]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "DBQ_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format (logs always go to stderr)
    #[arg(long, env = "DBQ_JSON_LOGS")]
    pub json_logs: bool,

    /// <CONNECTION_INFO> <SQL> [BIND_ARG ...]
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build a configuration around the given positional arguments.
    pub fn with_args(encoding: ArgEncoding, args: Vec<String>) -> Self {
        Self {
            encoding,
            args,
            ..Self::default()
        }
    }

    /// Maximum lifetime of the single database connection.
    pub fn connection_max_lifetime() -> Duration {
        Duration::from_secs(CONNECTION_MAX_LIFETIME_SECS)
    }

    /// How long to keep retrying the initial connection.
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: ArgEncoding::Base64,
            format: OutputFormat::Json,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
            args: Vec::new(),
        }
    }
}
