//!
//! Fusing the join tree with the schema model into a render-ready tree.
//!
//! Only relations explicitly present in the join tree are visited, so a
//! schema with cyclic relations never expands on its own.
//!

use std::sync::Arc;

use crate::join::{JoinNode, JoinType};
use crate::schema::{Field, RelationKind, RelationLink, SchemaFn, TableSchema};
use crate::subquery::SubqueryProvider;
use crate::{JaggError, JaggResult};

/// A table in the relation tree, with everything needed to render it.
#[derive(Clone)]
pub struct Relation {
    /// Dotted join path, empty for the root.
    pub path: String,
    pub alias: String,
    pub table: String,
    pub primary_key: Option<String>,
    pub join_type: JoinType,
    pub subquery: Option<Arc<dyn SubqueryProvider>>,
    pub order_by: Option<String>,
    pub fields: Vec<Field>,
    pub one: Vec<Joined>,
    pub many: Vec<Joined>,
}

/// A child relation together with the keys joining it to its parent.
#[derive(Clone, Debug)]
pub struct Joined {
    pub json_key: String,
    pub foreign_key: String,
    /// The primary key the foreign key points at: the child's for
    /// one-relations, the parent's for many-relations.
    pub referenced_key: String,
    pub relation: Relation,
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Relation")
            .field("path", &self.path)
            .field("alias", &self.alias)
            .field("table", &self.table)
            .field("primary_key", &self.primary_key)
            .field("join_type", &self.join_type)
            .field("subquery", &self.subquery.is_some())
            .field("order_by", &self.order_by)
            .field("fields", &self.fields)
            .field("one", &self.one)
            .field("many", &self.many)
            .finish()
    }
}

/// Build the relation tree for `root`, following the paths of `tree`.
pub fn build(root: SchemaFn, tree: &JoinNode) -> JaggResult<Relation> {
    let (schema, table) = resolve_table(root)?;
    let alias = table.clone();

    build_relation(schema, table, tree, String::new(), alias)
}

fn resolve_table(schema_fn: SchemaFn) -> JaggResult<(TableSchema, String)> {
    let schema = schema_fn().resolve()?;
    match schema.table_name.clone() {
        Some(table) => Ok((schema, table)),
        None => Err(JaggError::Schema {
            name: schema.name,
            reason: "not a table".to_string(),
        }),
    }
}

fn build_relation(
    schema: TableSchema,
    table: String,
    node: &JoinNode,
    path: String,
    alias: String,
) -> JaggResult<Relation> {
    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        let child_path = if path.is_empty() {
            child.field_name.clone()
        } else {
            format!("{}.{}", path, child.field_name)
        };
        let (position, link) = lookup_relation(&schema, &child.field_name, &child_path)?;
        children.push((position, link.clone(), child, child_path));
    }

    // declaration order keeps the output independent of join registration order
    children.sort_by_key(|(position, ..)| *position);

    let mut one = vec![];
    let mut many = vec![];

    for (_, link, child, child_path) in children {
        let (child_schema, child_table) = resolve_table(link.target)?;

        let referenced_key = match link.kind {
            RelationKind::One => child_schema.primary_key.clone().ok_or_else(|| {
                JaggError::MissingPrimaryKey {
                    path: child_path.clone(),
                    table: child_table.clone(),
                }
            })?,
            RelationKind::Many => schema.primary_key.clone().ok_or_else(|| {
                JaggError::MissingPrimaryKey {
                    path: child_path.clone(),
                    table: table.clone(),
                }
            })?,
        };

        let child_alias = format!("{}.{}", alias, link.json_key);

        tracing::trace!(path = %child_path, alias = %child_alias, kind = ?link.kind, "resolved relation");

        let joined = Joined {
            json_key: link.json_key,
            foreign_key: link.foreign_key,
            referenced_key,
            relation: build_relation(child_schema, child_table, child, child_path, child_alias)?,
        };

        match link.kind {
            RelationKind::One => one.push(joined),
            RelationKind::Many => many.push(joined),
        }
    }

    Ok(Relation {
        path,
        alias,
        table,
        primary_key: schema.primary_key,
        join_type: node.spec.join_type,
        subquery: node.spec.subquery.clone(),
        order_by: node.spec.order_by.clone(),
        fields: schema.fields,
        one,
        many,
    })
}

fn lookup_relation<'s>(
    schema: &'s TableSchema,
    field_name: &str,
    path: &str,
) -> JaggResult<(usize, &'s RelationLink)> {
    match schema
        .relations
        .iter()
        .position(|link| link.field_name == field_name)
    {
        Some(position) => Ok((position, &schema.relations[position])),
        None if schema.has_scalar(field_name) => Err(JaggError::UnsupportedRelationKind {
            path: path.to_string(),
            field: field_name.to_string(),
            table: schema.name.clone(),
        }),
        None => Err(JaggError::UnknownJoinField {
            path: path.to_string(),
            field: field_name.to_string(),
            table: schema.name.clone(),
        }),
    }
}
