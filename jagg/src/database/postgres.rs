use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::value::Value;

/// Bind rendered arguments, in order, onto a `sqlx` query.
pub fn bind<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: Vec<Value>,
) -> Query<'q, Postgres, PgArguments> {
    for value in args {
        query = match value {
            Value::Text(text) => query.bind(text),
            Value::Int(int) => query.bind(int),
            Value::Float(float) => query.bind(float),
            Value::Bool(flag) => query.bind(flag),
            Value::Bytes(bytes) => query.bind(bytes),
            Value::Null => query.bind(None::<String>),
        };
    }

    query
}
