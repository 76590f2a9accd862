//! Data models for db-json-query.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{ConnectionInfo, ConnectionTarget};
pub use query::{QueryResult, QuerySpec, ResultRow, RowValue};
