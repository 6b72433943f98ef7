//!
//! Compile a root table and a set of relation join paths into one
//! PostgreSQL statement, returning the rows as a JSON array with the related
//! rows embedded as nested objects and arrays.
//!
//! ```text
//!            user
//!           /    \
//!     profile    songs[]        select json_agg(...) as "user_json"
//!     (one)      (many)   ==>   from (...) as "user"
//!                  \            left join lateral (...) as "user.profile" on ...
//!                  tracks[]     left join lateral (select ... group by ...) "user.songs" on ...
//! ```
//!
//! The pipeline is:
//! 1. join paths are merged into a [join::JoinNode] tree,
//! 2. the tree is fused with the [schema] into a [relation::Relation] tree,
//! 3. the relation tree is rendered, renumbering the `$N` placeholders of
//!    custom subqueries with [tokenize::renumber].
//!

extern crate self as jagg;

pub use jagg_macros::*;

pub mod builder;
pub mod database;
pub mod join;
pub mod relation;
pub mod render;
pub mod schema;
pub mod subquery;
pub mod tokenize;
pub mod value;

mod select;

pub use join::{JoinSpec, JoinType};
pub use render::RenderOptions;
pub use schema::{Field, RelationKind, RelationLink, TableSchema};
pub use select::{select, Select};
pub use subquery::{BoxError, Subquery};
pub use value::Value;

/// A record type mapped onto a database table.
///
/// Usually implemented through the `#[jagg::table]` attribute.
pub trait Table {
    fn schema() -> TableSchema;
}

#[derive(thiserror::Error, Debug)]
pub enum JaggError {
    #[error("Schema error in `{name}`: {reason}")]
    Schema { name: String, reason: String },

    #[error("Unknown join field `{field}` on `{table}` (path `{path}`)")]
    UnknownJoinField {
        path: String,
        field: String,
        table: String,
    },

    #[error("Field `{field}` on `{table}` is not a relation (path `{path}`)")]
    UnsupportedRelationKind {
        path: String,
        field: String,
        table: String,
    },

    #[error("Joining `{path}` requires a primary key on `{table}`")]
    MissingPrimaryKey { path: String, table: String },

    #[error("Subquery for `{path}` failed: {source}")]
    SubqueryProvider {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Malformed placeholder `${0}`")]
    Tokenizer(String),
}

pub type JaggResult<T> = Result<T, JaggError>;
