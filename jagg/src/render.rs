//!
//! Rendering the relation tree into one PostgreSQL statement.
//!
//! Every table is read through a source producing a synthetic row number,
//! and aggregated with `json_agg(... order by <row number>)`, so array order
//! survives the reordering lateral joins may introduce.
//!
//! ```sql
//! select
//!   json_agg(
//!     case when "user"."id" is null then null
//!     else json_strip_nulls(json_build_object(
//!       'id', "user"."id",
//!       'songs', "user.songs"."user.songs_json"
//!     )) end
//!     order by "user"."seq"
//!   ) as "user_json"
//! from (select *, row_number() over () as "seq" from "user") as "user"
//! left join lateral (
//!   select "user.songs"."user_id", json_agg(...) as "user.songs_json"
//!   from (
//!     select *, row_number() over () as "seq" from "song" as "user.songs"
//!     where "user.songs"."user_id" = "user"."id"
//!   ) as "user.songs"
//!   group by "user.songs"."user_id"
//! ) "user.songs" on "user.songs"."user_id" = "user"."id"
//! ```
//!

use crate::builder::{quote_column, QueryBuilder};
use crate::relation::Relation;
use crate::tokenize;
use crate::value::Value;
use crate::{JaggError, JaggResult};

/// Layout and naming knobs for the rendered statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderOptions {
    /// Break the statement over indented lines instead of a single line.
    pub pretty: bool,
    /// Name of the synthetic row number column used to order aggregation.
    /// Custom subqueries must project a column of this name.
    pub seq_column: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            seq_column: "seq".to_string(),
        }
    }
}

/// Render `root` into SQL text and its flattened, ordered argument list.
pub fn render(root: &Relation, options: &RenderOptions) -> JaggResult<(String, Vec<Value>)> {
    let mut renderer = Renderer {
        builder: QueryBuilder::new(options.pretty),
        args: vec![],
        options,
    };

    renderer.select(root, None)?;

    Ok((renderer.builder.build(), renderer.args))
}

/// How a many-relation is tied to its parent.
struct Correlation<'r> {
    parent_alias: &'r str,
    foreign_key: &'r str,
    referenced_key: &'r str,
}

struct Renderer<'o> {
    builder: QueryBuilder,
    args: Vec<Value>,
    options: &'o RenderOptions,
}

impl<'o> Renderer<'o> {
    fn select(&mut self, relation: &Relation, correlation: Option<Correlation>) -> JaggResult<()> {
        let alias = &relation.alias;

        self.builder.push("select");
        self.builder.newline_indent();

        if let Some(correlation) = &correlation {
            self.builder.push_column(alias, correlation.foreign_key);
            self.builder.push(",");
            self.builder.newline();
        }

        self.builder.push("json_agg(");
        json_object(&mut self.builder, relation);
        self.builder.push(" order by ");
        if let Some(order_by) = &relation.order_by {
            self.builder.push(order_by);
            self.builder.push(", ");
        }
        self.builder.push_column(alias, &self.options.seq_column);
        self.builder.push(") as ");
        self.builder.push_ident(&aggregate_column(relation));
        self.builder.newline_outdent();

        let condition = correlation.as_ref().map(|correlation| {
            format!(
                "{} = {}",
                quote_column(alias, correlation.foreign_key),
                quote_column(correlation.parent_alias, correlation.referenced_key)
            )
        });

        self.builder.push("from ");
        self.source(relation, condition.as_deref())?;
        self.joins(relation)?;

        if let Some(correlation) = &correlation {
            self.builder.newline();
            self.builder.push("group by ");
            self.builder.push_column(alias, correlation.foreign_key);
        }

        Ok(())
    }

    /// `(source) as "alias"`, where the source is either the default row
    /// numbered table scan or the relation's own subquery.
    fn source(&mut self, relation: &Relation, condition: Option<&str>) -> JaggResult<()> {
        self.builder.push("(");

        match &relation.subquery {
            None => {
                self.builder.push("select *, row_number() over () as ");
                self.builder.push_ident(&self.options.seq_column);
                self.builder.push(" from ");
                self.builder.push_ident(&relation.table);

                if let Some(condition) = condition {
                    self.builder.push(" as ");
                    self.builder.push_ident(&relation.alias);
                    self.builder.push(" where ");
                    self.builder.push(condition);
                }
            }
            Some(provider) => {
                let subquery = provider
                    .subquery(condition.unwrap_or(""))
                    .map_err(|source| JaggError::SubqueryProvider {
                        path: relation.path.clone(),
                        source,
                    })?;

                let sql = tokenize::renumber(&subquery.sql, self.args.len())?;
                self.args.extend(subquery.args);
                self.builder.push(&sql);
            }
        }

        self.builder.push(") as ");
        self.builder.push_ident(&relation.alias);

        Ok(())
    }

    fn joins(&mut self, relation: &Relation) -> JaggResult<()> {
        for one in &relation.one {
            let child = &one.relation;

            self.builder.newline();
            self.builder.push(child.join_type.as_sql());
            self.builder.push(" lateral ");
            self.source(child, None)?;
            self.builder.push(" on ");
            self.builder.push_column(&child.alias, &one.referenced_key);
            self.builder.push(" = ");
            self.builder.push_column(&relation.alias, &one.foreign_key);

            self.joins(child)?;
        }

        for many in &relation.many {
            let child = &many.relation;

            self.builder.newline();
            self.builder.push(child.join_type.as_sql());
            self.builder.push(" lateral (");
            self.builder.newline_indent();

            self.select(
                child,
                Some(Correlation {
                    parent_alias: &relation.alias,
                    foreign_key: &many.foreign_key,
                    referenced_key: &many.referenced_key,
                }),
            )?;

            self.builder.newline_outdent();
            self.builder.push(") ");
            self.builder.push_ident(&child.alias);
            self.builder.push(" on ");
            self.builder.push_column(&child.alias, &many.foreign_key);
            self.builder.push(" = ");
            self.builder.push_column(&relation.alias, &many.referenced_key);
        }

        Ok(())
    }
}

fn aggregate_column(relation: &Relation) -> String {
    format!("{}_json", relation.alias)
}

/// The JSON object for one row of `relation`, with one-relations inlined.
fn json_object(builder: &mut QueryBuilder, relation: &Relation) {
    let alias = &relation.alias;

    if let Some(primary_key) = &relation.primary_key {
        builder.push("case when ");
        builder.push_column(alias, primary_key);
        builder.push(" is null then null else ");
    }

    builder.push("json_strip_nulls(json_build_object(");

    let mut first = true;
    let mut key = |builder: &mut QueryBuilder, json_key: &str| {
        if !first {
            builder.push(", ");
        }
        first = false;
        builder.push_literal(json_key);
        builder.push(", ");
    };

    for field in &relation.fields {
        key(builder, &field.json_key);
        builder.push_column(alias, &field.column);
    }

    for one in &relation.one {
        key(builder, &one.json_key);
        json_object(builder, &one.relation);
    }

    for many in &relation.many {
        key(builder, &many.json_key);
        builder.push_column(&many.relation.alias, &aggregate_column(&many.relation));
    }

    builder.push("))");

    if relation.primary_key.is_some() {
        builder.push(" end");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::join::{JoinNode, JoinSpec, JoinType};
    use crate::relation;
    use crate::schema::{Field, RelationLink, TableSchema};
    use crate::subquery::{BoxError, Subquery};

    fn user() -> TableSchema {
        TableSchema::new("User")
            .table_name("user")
            .primary_key("id")
            .field(Field::new("id"))
            .field(Field::new("name"))
            .relation(RelationLink::many("songs", "user_id", song))
    }

    fn song() -> TableSchema {
        TableSchema::new("Song")
            .table_name("song")
            .primary_key("id")
            .field(Field::new("id"))
            .field(Field::new("title"))
            .relation(RelationLink::one("user", "user_id", user))
    }

    fn pivot() -> TableSchema {
        TableSchema::new("Pivot")
            .table_name("pivot")
            .field(Field::new("a"))
    }

    fn render_paths(root: fn() -> TableSchema, joins: BTreeMap<String, JoinSpec>) -> JaggResult<(String, Vec<Value>)> {
        let tree = JoinNode::build(JoinSpec::new(JoinType::Left), &joins);
        let relation = relation::build(root, &tree)?;
        render(&relation, &RenderOptions::default())
    }

    fn left(paths: &[&str]) -> BTreeMap<String, JoinSpec> {
        paths
            .iter()
            .map(|path| (path.to_string(), JoinSpec::new(JoinType::Left)))
            .collect()
    }

    #[test]
    fn root_only() {
        let (sql, args) = render_paths(user, left(&[])).unwrap();

        assert_eq!(
            sql,
            concat!(
                r#"select json_agg(case when "user"."id" is null then null else "#,
                r#"json_strip_nulls(json_build_object('id', "user"."id", 'name', "user"."name")) end "#,
                r#"order by "user"."seq") as "user_json" "#,
                r#"from (select *, row_number() over () as "seq" from "user") as "user""#
            )
        );
        assert!(args.is_empty());
    }

    #[test]
    fn one_to_many() {
        let (sql, _) = render_paths(user, left(&["songs"])).unwrap();

        assert_eq!(
            sql,
            concat!(
                r#"select json_agg(case when "user"."id" is null then null else "#,
                r#"json_strip_nulls(json_build_object('id', "user"."id", 'name', "user"."name", "#,
                r#"'songs', "user.songs"."user.songs_json")) end "#,
                r#"order by "user"."seq") as "user_json" "#,
                r#"from (select *, row_number() over () as "seq" from "user") as "user" "#,
                r#"left join lateral ( select "user.songs"."user_id", "#,
                r#"json_agg(case when "user.songs"."id" is null then null else "#,
                r#"json_strip_nulls(json_build_object('id', "user.songs"."id", 'title', "user.songs"."title")) end "#,
                r#"order by "user.songs"."seq") as "user.songs_json" "#,
                r#"from (select *, row_number() over () as "seq" from "song" as "user.songs" "#,
                r#"where "user.songs"."user_id" = "user"."id") as "user.songs" "#,
                r#"group by "user.songs"."user_id" ) "user.songs" "#,
                r#"on "user.songs"."user_id" = "user"."id""#
            )
        );
    }

    #[test]
    fn many_to_one_is_inlined() {
        let (sql, _) = render_paths(song, left(&["user"])).unwrap();

        assert!(sql.contains(
            r#"'user', case when "song.user"."id" is null then null else json_strip_nulls(json_build_object('id', "song.user"."id""#
        ));
        assert!(sql.contains(
            r#"left join lateral (select *, row_number() over () as "seq" from "user") as "song.user" on "song.user"."id" = "song"."user_id""#
        ));
        assert!(!sql.contains("group by"));
    }

    #[test]
    fn primary_key_less_table_skips_null_guard() {
        let (sql, _) = render_paths(pivot, left(&[])).unwrap();

        assert!(!sql.contains("case when"));
        assert!(sql.starts_with(
            r#"select json_agg(json_strip_nulls(json_build_object('a', "pivot"."a")) order by "pivot"."seq")"#
        ));
    }

    #[test]
    fn provider_receives_correlation_condition() {
        let mut joins = BTreeMap::new();
        let provider = |condition: &str| -> Result<Subquery, BoxError> {
            Ok(Subquery::new(format!(r#"select *, row_number() over () as seq from song as "user.songs" where {} and title = $1"#, condition)).bind("x"))
        };
        joins.insert(
            "songs".to_string(),
            JoinSpec::with_subquery(JoinType::Inner, Arc::new(provider)),
        );

        let (sql, args) = render_paths(user, joins).unwrap();

        assert!(sql.contains(r#"(select *, row_number() over () as seq from song as "user.songs" where "user.songs"."user_id" = "user"."id" and title = $1) as "user.songs""#));
        assert!(sql.contains("inner join lateral"));
        assert_eq!(args, vec![Value::from("x")]);
    }

    #[test]
    fn aggregate_order_precedes_row_number() {
        let mut joins = left(&[]);
        joins.insert(
            "songs".to_string(),
            JoinSpec::new(JoinType::Left).order_by(r#""user.songs"."title" desc"#),
        );

        let (sql, _) = render_paths(user, joins).unwrap();

        assert!(sql.contains(r#"end order by "user.songs"."title" desc, "user.songs"."seq") as "user.songs_json""#));
        assert!(sql.contains(r#"end order by "user"."seq") as "user_json""#));
    }

    #[test]
    fn self_referencing_many_keeps_parent_in_scope() {
        fn employee() -> TableSchema {
            TableSchema::new("Employee")
                .table_name("employee")
                .primary_key("id")
                .field(Field::new("id"))
                .relation(RelationLink::many("reports", "manager_id", employee))
        }

        let (sql, _) = render_paths(employee, left(&["reports"])).unwrap();

        assert!(sql.contains(concat!(
            r#"from (select *, row_number() over () as "seq" from "employee" as "employee.reports" "#,
            r#"where "employee.reports"."manager_id" = "employee"."id") as "employee.reports""#
        )));
        assert!(!sql.contains(r#""employee"."manager_id""#));
    }

    #[test]
    fn pretty_layout_breaks_lines() {
        let tree = JoinNode::build(JoinSpec::new(JoinType::Left), &left(&["songs"]));
        let relation = relation::build(user, &tree).unwrap();
        let options = RenderOptions {
            pretty: true,
            seq_column: "jagg_rn".to_string(),
        };

        let (sql, _) = render(&relation, &options).unwrap();

        assert!(sql.starts_with("select\n  json_agg("));
        assert!(sql.contains("\nfrom (select *, row_number() over () as \"jagg_rn\" from \"user\") as \"user\"\nleft join lateral (\n  select\n"));
        assert!(sql.contains("order by \"user.songs\".\"jagg_rn\""));
    }
}
