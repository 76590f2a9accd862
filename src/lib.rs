//! db-json-query library
//!
//! Decodes a connection payload, a SQL statement and its bind arguments,
//! runs the statement once against MySQL and renders the rows as JSON.

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod input;
pub mod models;
pub mod runner;

pub use config::Config;
pub use error::{CliError, CliResult};
pub use runner::run;
