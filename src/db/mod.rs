//! Database access layer.
//!
//! This module provides database access functionality:
//! - Single-connection management
//! - Query execution with positional text binds
//! - MySQL type mappings

pub mod executor;
pub mod params;
pub mod pool;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::PoolGuard;
pub use types::TypeCategory;
