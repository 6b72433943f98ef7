//!
//! Join specifications, and the tree they merge into.
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::subquery::SubqueryProvider;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinType {
    Left,
    Right,
    Inner,
    FullOuter,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Inner => "inner join",
            Self::FullOuter => "full outer join",
        }
    }
}

/// What was requested for one join path.
#[derive(Clone)]
pub struct JoinSpec {
    pub join_type: JoinType,
    pub subquery: Option<Arc<dyn SubqueryProvider>>,
    /// SQL ordering expression aggregated rows are sorted by, ahead of the
    /// row number.
    pub order_by: Option<String>,
}

impl JoinSpec {
    pub fn new(join_type: JoinType) -> Self {
        Self {
            join_type,
            subquery: None,
            order_by: None,
        }
    }

    pub fn with_subquery(join_type: JoinType, provider: Arc<dyn SubqueryProvider>) -> Self {
        Self {
            join_type,
            subquery: Some(provider),
            order_by: None,
        }
    }

    /// Sort the aggregated array by `expr`, e.g. `"user.songs"."title" desc`.
    ///
    /// The expression is spliced verbatim and must not contain placeholders.
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }
}

impl std::fmt::Debug for JoinSpec {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("JoinSpec")
            .field("join_type", &self.join_type)
            .field("subquery", &self.subquery.is_some())
            .field("order_by", &self.order_by)
            .finish()
    }
}

///
/// One node of the join tree.
///
/// The root node has an empty field name and carries the params of `select`.
/// A node that only exists because a longer path passes through it is not
/// `explicit`, and carries just the join type of the request that created it.
///
#[derive(Clone, Debug)]
pub struct JoinNode {
    pub field_name: String,
    pub spec: JoinSpec,
    pub explicit: bool,
    pub children: Vec<JoinNode>,
}

impl JoinNode {
    /// Merge flat dotted join paths into a tree below the root spec.
    pub fn build(root: JoinSpec, joins: &BTreeMap<String, JoinSpec>) -> Self {
        let mut tree = Self {
            field_name: String::new(),
            spec: root,
            explicit: true,
            children: vec![],
        };

        for (path, spec) in joins {
            tree.insert(path, spec);
        }

        tree
    }

    pub fn child(&self, field_name: &str) -> Option<&JoinNode> {
        self.children
            .iter()
            .find(|child| child.field_name == field_name)
    }

    /// Dotted paths of all nodes below this one, depth first.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = vec![];
        for child in &self.children {
            paths.push(child.field_name.clone());
            paths.extend(
                child
                    .paths()
                    .into_iter()
                    .map(|path| format!("{}.{}", child.field_name, path)),
            );
        }
        paths
    }

    fn insert(&mut self, path: &str, spec: &JoinSpec) {
        let mut node = self;
        for segment in path.split('.') {
            node = node.child_or_insert(segment, spec.join_type);
        }

        node.spec = spec.clone();
        node.explicit = true;
    }

    fn child_or_insert(&mut self, field_name: &str, join_type: JoinType) -> &mut JoinNode {
        let index = match self
            .children
            .iter()
            .position(|child| child.field_name == field_name)
        {
            Some(index) => index,
            None => {
                self.children.push(JoinNode {
                    field_name: field_name.to_string(),
                    spec: JoinSpec::new(join_type),
                    explicit: false,
                    children: vec![],
                });
                self.children.len() - 1
            }
        };

        &mut self.children[index]
    }
}
