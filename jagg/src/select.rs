use std::collections::BTreeMap;
use std::sync::Arc;

use crate::join::{JoinNode, JoinSpec, JoinType};
use crate::relation;
use crate::render::{self, RenderOptions};
use crate::schema::SchemaFn;
use crate::subquery::{BoxError, Subquery};
use crate::value::Value;
use crate::{JaggResult, Table};

///
/// A select of some root table, along with the relations to embed.
///
/// Every method consumes the select and returns a new one, and `clone`
/// copies the registered joins, so a clone can be extended without
/// affecting what the original renders.
///
#[derive(Clone)]
#[must_use]
pub struct Select {
    root: SchemaFn,
    root_spec: JoinSpec,
    joins: BTreeMap<String, JoinSpec>,
    options: RenderOptions,
}

/// Select from the table described by `T`.
pub fn select<T: Table>() -> Select {
    Select::from_schema(T::schema)
}

impl Select {
    /// Select from an explicitly supplied schema.
    pub fn from_schema(root: SchemaFn) -> Self {
        Self {
            root,
            root_spec: JoinSpec::new(JoinType::Left),
            joins: BTreeMap::new(),
            options: RenderOptions::default(),
        }
    }

    /// Read the root table through a custom subquery.
    pub fn subquery<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.root_spec.subquery = Some(Arc::new(provider));
        self
    }

    /// Sort the root array by `expr` before falling back to row order.
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.root_spec.order_by = Some(expr.into());
        self
    }

    /// Register a fully described join at the dotted `path`.
    pub fn join_spec(mut self, path: impl Into<String>, spec: JoinSpec) -> Self {
        self.joins.insert(path.into(), spec);
        self
    }

    /// Sort the array embedded at `path` by `expr`.
    ///
    /// An unregistered path is registered as a left join. Registering the
    /// path again afterwards replaces the ordering along with the rest.
    pub fn order_join_by(mut self, path: impl Into<String>, expr: impl Into<String>) -> Self {
        self.joins
            .entry(path.into())
            .or_insert_with(|| JoinSpec::new(JoinType::Left))
            .order_by = Some(expr.into());
        self
    }

    /// Embed the relation at the dotted `path`.
    ///
    /// Registering the same path twice replaces the earlier registration.
    pub fn join(mut self, join_type: JoinType, path: impl Into<String>) -> Self {
        self.joins.insert(path.into(), JoinSpec::new(join_type));
        self
    }

    /// Embed the relation at the dotted `path`, read through a custom subquery.
    pub fn join_with<F>(mut self, join_type: JoinType, path: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.joins.insert(
            path.into(),
            JoinSpec::with_subquery(join_type, Arc::new(provider)),
        );
        self
    }

    pub fn left_join(self, path: impl Into<String>) -> Self {
        self.join(JoinType::Left, path)
    }

    pub fn right_join(self, path: impl Into<String>) -> Self {
        self.join(JoinType::Right, path)
    }

    pub fn inner_join(self, path: impl Into<String>) -> Self {
        self.join(JoinType::Inner, path)
    }

    pub fn full_outer_join(self, path: impl Into<String>) -> Self {
        self.join(JoinType::FullOuter, path)
    }

    pub fn left_join_with<F>(self, path: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.join_with(JoinType::Left, path, provider)
    }

    pub fn right_join_with<F>(self, path: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.join_with(JoinType::Right, path, provider)
    }

    pub fn inner_join_with<F>(self, path: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.join_with(JoinType::Inner, path, provider)
    }

    pub fn full_outer_join_with<F>(self, path: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&str) -> Result<Subquery, BoxError> + Send + Sync + 'static,
    {
        self.join_with(JoinType::FullOuter, path, provider)
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the statement and its ordered arguments.
    ///
    /// Nothing is rendered unless every join path resolves and every
    /// subquery succeeds.
    pub fn render(&self) -> JaggResult<(String, Vec<Value>)> {
        let tree = JoinNode::build(self.root_spec.clone(), &self.joins);
        let relation = relation::build(self.root, &tree)?;
        let (sql, args) = render::render(&relation, &self.options)?;

        tracing::debug!(
            table = %relation.table,
            joins = self.joins.len(),
            sql = %sql,
            arg_count = args.len(),
            "rendered select"
        );

        Ok((sql, args))
    }

    /// Render, panicking on error.
    ///
    /// Only meant for selects whose shape is fixed and known to be valid,
    /// e.g. checked once at startup.
    pub fn must_render(&self) -> (String, Vec<Value>) {
        match self.render() {
            Ok(rendered) => rendered,
            Err(err) => panic!("failed to render select: {}", err),
        }
    }
}

impl std::fmt::Debug for Select {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Select")
            .field("root", &(self.root)().name)
            .field("root_spec", &self.root_spec)
            .field("joins", &self.joins)
            .field("options", &self.options)
            .finish()
    }
}
