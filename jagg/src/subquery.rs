//!
//! Caller-supplied subqueries.
//!
//! A subquery provider replaces the default `select *` source of a relation.
//! It receives the correlation condition (a boolean SQL expression, empty for
//! the root and for one-relations) which it must splice into its own `where`
//! clause when non-empty. The condition refers to the relation's alias, e.g.
//! `"user.songs"."user_id" = "user"."id"`, so the provider has to name its
//! table after that alias: `from song as "user.songs" where ...`.
//! The returned SQL numbers its placeholders from `$1`; they are renumbered
//! when spliced into the final statement.
//!

use crate::value::Value;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL text plus the arguments its `$N` placeholders refer to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subquery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Subquery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: vec![],
        }
    }

    /// Append the argument for the next placeholder.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

pub trait SubqueryProvider: Send + Sync {
    fn subquery(&self, condition: &str) -> Result<Subquery, BoxError>;
}

impl<F> SubqueryProvider for F
where
    F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync,
{
    fn subquery(&self, condition: &str) -> Result<Subquery, BoxError> {
        self(condition)
    }
}
