//!
//! The schema model: how record types map onto tables, columns and relations.
//!
//! Schemas are plain values. They are produced either by hand, through the
//! builder methods below, or by the `#[jagg::table]` attribute macro.
//! Relations point at their target lazily through a [SchemaFn], so two
//! tables referencing each other can both be described.
//!

use crate::{JaggError, JaggResult};

/// Lazily produce the schema of some related table.
pub type SchemaFn = fn() -> TableSchema;

/// A scalar column projected into the JSON document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub column: String,
    pub json_key: String,
}

impl Field {
    /// A field whose JSON key is the column name.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            json_key: column.clone(),
            column,
        }
    }

    pub fn json_key(mut self, json_key: impl Into<String>) -> Self {
        self.json_key = json_key.into();
        self
    }

    fn is_named(&self, name: &str) -> bool {
        self.column == name || self.json_key == name
    }
}

/// Whether a relation yields a single embedded object or an array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationKind {
    /// The parent holds the foreign key, pointing at the child's primary key.
    One,
    /// The child holds the foreign key, pointing at the parent's primary key.
    Many,
}

/// How a child record type relates to its parent.
#[derive(Clone, Debug)]
pub struct RelationLink {
    /// The name used to address this relation in join paths.
    pub field_name: String,
    pub kind: RelationKind,
    pub foreign_key: String,
    pub json_key: String,
    /// Embedded links are flattened into the parent instead of being joined.
    pub embed: bool,
    pub target: SchemaFn,
}

impl RelationLink {
    /// The parent's `foreign_key` column references the target's primary key.
    pub fn one(field_name: impl Into<String>, foreign_key: impl Into<String>, target: SchemaFn) -> Self {
        Self::new(field_name.into(), RelationKind::One, foreign_key.into(), target)
    }

    /// The target's `foreign_key` column references the parent's primary key.
    pub fn many(field_name: impl Into<String>, foreign_key: impl Into<String>, target: SchemaFn) -> Self {
        Self::new(field_name.into(), RelationKind::Many, foreign_key.into(), target)
    }

    /// Flatten the target's fields and relations into the parent.
    pub fn embed(field_name: impl Into<String>, target: SchemaFn) -> Self {
        let mut link = Self::new(field_name.into(), RelationKind::One, String::new(), target);
        link.embed = true;
        link
    }

    pub fn json_key(mut self, json_key: impl Into<String>) -> Self {
        self.json_key = json_key.into();
        self
    }

    fn new(field_name: String, kind: RelationKind, foreign_key: String, target: SchemaFn) -> Self {
        Self {
            json_key: field_name.clone(),
            field_name,
            kind,
            foreign_key,
            embed: false,
            target,
        }
    }
}

/// Description of one record type.
///
/// A schema without a `table_name` is a fragment, only usable through embedding.
#[derive(Clone, Debug)]
pub struct TableSchema {
    /// Name of the described type, used in error messages.
    pub name: String,
    pub table_name: Option<String>,
    pub primary_key: Option<String>,
    pub fields: Vec<Field>,
    pub relations: Vec<RelationLink>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            primary_key: None,
            fields: vec![],
            relations: vec![],
        }
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn relation(mut self, link: RelationLink) -> Self {
        self.relations.push(link);
        self
    }

    /// Find a joinable relation by its field name.
    pub fn find_relation(&self, field_name: &str) -> Option<&RelationLink> {
        self.relations
            .iter()
            .find(|link| link.field_name == field_name)
    }

    /// Whether `name` refers to a scalar field of this schema.
    pub fn has_scalar(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.is_named(name))
    }

    ///
    /// Expand all embedded relations into this schema.
    ///
    /// Embedded fields and relations come first, in declaration order,
    /// followed by the schema's own members. The table name and primary key
    /// of an embedded schema are only taken when this schema lacks them.
    ///
    pub fn resolve(self) -> JaggResult<Self> {
        self.resolve_embeds(&mut vec![])
    }

    fn resolve_embeds(self, stack: &mut Vec<String>) -> JaggResult<Self> {
        if stack.contains(&self.name) {
            return Err(JaggError::Schema {
                name: self.name,
                reason: "embedding cycle".to_string(),
            });
        }
        stack.push(self.name.clone());

        let mut resolved = Self {
            name: self.name,
            table_name: self.table_name,
            primary_key: self.primary_key,
            fields: vec![],
            relations: vec![],
        };
        let mut own_relations = vec![];

        for link in self.relations {
            if !link.embed {
                own_relations.push(link);
                continue;
            }

            let embedded = (link.target)().resolve_embeds(stack)?;
            resolved.table_name = resolved.table_name.or(embedded.table_name);
            resolved.primary_key = resolved.primary_key.or(embedded.primary_key);
            resolved.fields.extend(embedded.fields);
            resolved.relations.extend(embedded.relations);
        }

        resolved.fields.extend(self.fields);
        resolved.relations.extend(own_relations);

        stack.pop();
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit() -> TableSchema {
        TableSchema::new("Audit").field(Field::new("created_at"))
    }

    fn user() -> TableSchema {
        TableSchema::new("User")
            .table_name("user")
            .primary_key("id")
            .field(Field::new("id"))
            .relation(RelationLink::many("songs", "user_id", song))
    }

    fn song() -> TableSchema {
        TableSchema::new("Song")
            .table_name("song")
            .primary_key("id")
            .field(Field::new("id"))
            .relation(RelationLink::one("user", "user_id", user))
    }

    fn extended_user() -> TableSchema {
        TableSchema::new("ExtendedUser")
            .field(Field::new("foo"))
            .relation(RelationLink::embed("user", user))
            .relation(RelationLink::embed("audit", audit))
    }

    fn looping() -> TableSchema {
        TableSchema::new("Looping")
            .table_name("looping")
            .relation(RelationLink::embed("me", looping))
    }

    #[test]
    fn embeds_are_flattened_first() {
        let schema = extended_user().resolve().unwrap();

        assert_eq!(schema.table_name.as_deref(), Some("user"));
        assert_eq!(schema.primary_key.as_deref(), Some("id"));
        let columns: Vec<_> = schema.fields.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, ["id", "created_at", "foo"]);
        assert!(schema.find_relation("songs").is_some());
        assert!(schema.find_relation("user").is_none());
    }

    #[test]
    fn own_table_name_wins_over_embedded() {
        let schema = TableSchema::new("Renamed")
            .table_name("renamed")
            .relation(RelationLink::embed("user", user))
            .resolve()
            .unwrap();

        assert_eq!(schema.table_name.as_deref(), Some("renamed"));
        assert_eq!(schema.primary_key.as_deref(), Some("id"));
    }

    #[test]
    fn embedding_cycle_is_rejected() {
        let err = looping().resolve().unwrap_err();
        assert!(matches!(err, JaggError::Schema { .. }));
    }

    #[test]
    fn cyclic_relations_resolve_lazily() {
        let schema = song().resolve().unwrap();
        let user = (schema.find_relation("user").unwrap().target)();
        assert_eq!(user.table_name.as_deref(), Some("user"));
    }

    #[test]
    fn scalar_lookup_matches_column_or_key() {
        let schema = TableSchema::new("T").field(Field::new("col").json_key("key"));
        assert!(schema.has_scalar("col"));
        assert!(schema.has_scalar("key"));
        assert!(!schema.has_scalar("other"));
    }
}
