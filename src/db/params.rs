//! Parameter binding utilities for database queries.
//!
//! Every bind argument is sent as text; the server performs any conversion
//! the statement needs.

use sqlx::MySql;
use sqlx::mysql::MySqlArguments;

/// Bind all parameters positionally, in order.
pub(crate) fn bind_text_params<'q>(
    mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    params: &'q [String],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = query.bind(param.as_str());
    }
    query
}
