//! The relational-algebra node vocabulary (C1).
//!
//! Every translator (TRC, SQL, RA-AST) emits trees built from this same
//! set of tagged nodes. A node exposes [`RaNode::check`] (schema
//! validation) and carries an optional [`CodeRegion`] copied down from the
//! AST node it was derived from, plus a `parenthesized` flag for
//! round-tripping a pretty-printed tree back to a visually equivalent one.

use serde::{Deserialize, Serialize};

use crate::catalog::{Column, Relation, Schema};
use crate::error::TranslateError;
use crate::value_expr::ValueExpr;

/// A byte span into the source text an AST node was parsed from, used only
/// for diagnostics (editor highlighting); never consulted by `check()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRegion {
    pub start: usize,
    pub end: usize,
}

impl CodeRegion {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Non-fatal diagnostic attached to a node via [`RaNode::add_warning`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
    pub code_region: Option<CodeRegion>,
}

/// The natural/theta join condition (C6's output shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinCondition {
    /// `null` in the source syntax: join on all like-named columns.
    Natural { restrict_to_columns: Option<Vec<String>> },
    /// An arbitrary boolean value-expression (a theta join).
    Theta { expression: ValueExpr },
}

/// One side-preference for a [`RaNode::SemiJoin`]: which side's schema the
/// result preserves. TRC only ever produces `Left` semi-joins (the "base"
/// side), but the vocabulary allows either, matching RA's usual definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemiJoinSide {
    Left,
    Right,
}

/// A tree of tagged relational-algebra operator nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaNode {
    pub kind: RaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_region: Option<CodeRegion>,
    #[serde(default)]
    pub parenthesized: bool,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaKind {
    // --- leaf -----------------------------------------------------------
    /// The result of a catalog lookup, carrying the defensively-copied
    /// relation (schema + inline rows, see [`Relation::copy`]).
    Relation { relation: Relation },

    // --- unary ------------------------------------------------------------
    Projection {
        child: Box<RaNode>,
        columns: Vec<ValueExpr>,
    },
    Selection {
        child: Box<RaNode>,
        predicate: ValueExpr,
    },
    RenameRelation {
        child: Box<RaNode>,
        new_alias: String,
    },
    RenameColumns {
        child: Box<RaNode>,
        mapping: Vec<(String, String)>,
    },
    OrderBy {
        child: Box<RaNode>,
        columns: Vec<String>,
        ascending: Vec<bool>,
    },
    GroupBy {
        child: Box<RaNode>,
        group_columns: Vec<String>,
        aggregates: Vec<(String, String)>,
    },

    // --- binary -----------------------------------------------------------
    CrossJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
    InnerJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        condition: JoinCondition,
    },
    LeftOuterJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        condition: JoinCondition,
    },
    RightOuterJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        condition: JoinCondition,
    },
    FullOuterJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        condition: JoinCondition,
    },
    SemiJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        preserve: SemiJoinSide,
    },
    AntiJoin {
        left: Box<RaNode>,
        right: Box<RaNode>,
        condition: Option<JoinCondition>,
    },
    Union {
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
    Intersect {
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
    Difference {
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
    Division {
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
}

impl RaNode {
    pub fn new(kind: RaKind) -> Self {
        Self {
            kind,
            code_region: None,
            parenthesized: false,
            warnings: Vec::new(),
        }
    }

    pub fn with_code_region(mut self, region: Option<CodeRegion>) -> Self {
        self.code_region = region;
        self
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn add_warning(&mut self, message: impl Into<String>, code_region: Option<CodeRegion>) {
        self.warnings.push(Warning {
            message: message.into(),
            code_region,
        });
    }

    /// Schema-validation hook. Every node derives its output schema from
    /// its children; a tree returned by a translator is fully resolved
    /// only after this succeeds (invariant in spec.md §3).
    ///
    /// Binary set operators (`Union`/`Intersect`/`Difference`) and
    /// `SemiJoin`/`AntiJoin` additionally require their two children's
    /// schemas to be *compatible* (same arity, same positional types,
    /// columns named identically once present). The translator is
    /// responsible for never producing an incompatible pair; `check()` is
    /// the mechanism by which that responsibility is verified.
    pub fn check(&self) -> Result<Schema, TranslateError> {
        use RaKind::*;
        match &self.kind {
            Relation { relation } => Ok(relation.schema.clone()),
            Projection { child, columns } => {
                let _ = child.check()?;
                Ok(columns
                    .iter()
                    .map(|c| Column::new(c.display_name(), c.result_type()))
                    .collect())
            }
            Selection { child, .. } => child.check(),
            RenameRelation { child, new_alias } => {
                let schema = child.check()?;
                Ok(schema
                    .into_iter()
                    .map(|mut c| {
                        c.relation_alias = Some(new_alias.clone());
                        c
                    })
                    .collect())
            }
            RenameColumns { child, mapping } => {
                let schema = child.check()?;
                Ok(schema
                    .into_iter()
                    .map(|mut c| {
                        if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == c.name) {
                            c.name = to.clone();
                        }
                        c
                    })
                    .collect())
            }
            OrderBy { child, .. } => child.check(),
            GroupBy {
                child,
                group_columns,
                aggregates,
            } => {
                let schema = child.check()?;
                let mut out: Vec<Column> = group_columns
                    .iter()
                    .filter_map(|g| schema.iter().find(|c| &c.name == g).cloned())
                    .collect();
                out.extend(aggregates.iter().map(|(alias, _)| {
                    Column::new(alias.clone(), crate::catalog::DataType::Number)
                }));
                Ok(out)
            }
            CrossJoin { left, right } => {
                let mut schema = left.check()?;
                schema.extend(right.check()?);
                Ok(schema)
            }
            InnerJoin { left, right, .. }
            | LeftOuterJoin { left, right, .. }
            | RightOuterJoin { left, right, .. }
            | FullOuterJoin { left, right, .. } => {
                let mut schema = left.check()?;
                schema.extend(right.check()?);
                Ok(schema)
            }
            SemiJoin { left, right, preserve } => {
                let left_schema = left.check()?;
                let right_schema = right.check()?;
                match preserve {
                    SemiJoinSide::Left => Ok(left_schema),
                    SemiJoinSide::Right => Ok(right_schema),
                }
            }
            AntiJoin { left, .. } => left.check(),
            Union { left, right } | Intersect { left, right } | Difference { left, right } => {
                let left_schema = left.check()?;
                let right_schema = right.check()?;
                if left_schema.len() != right_schema.len() {
                    return Err(TranslateError::UnsupportedNode {
                        detail: format!(
                            "incompatible schemas: {} columns vs {} columns",
                            left_schema.len(),
                            right_schema.len()
                        ),
                        code_region: self.code_region,
                    });
                }
                Ok(left_schema)
            }
            Division { left, .. } => left.check(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::value_expr::ValueExpr;

    fn leaf(name: &str, columns: &[&str]) -> RaNode {
        let schema = columns
            .iter()
            .map(|c| Column::new(*c, DataType::Number))
            .collect();
        RaNode::new(RaKind::Relation {
            relation: Relation::new(name, schema),
        })
    }

    #[test]
    fn relation_leaf_reports_catalog_schema() {
        let node = leaf("R", &["a", "b"]);
        assert_eq!(node.check().unwrap().len(), 2);
    }

    #[test]
    fn cross_join_concatenates_schemas() {
        let left = leaf("R", &["a"]);
        let right = leaf("S", &["b"]);
        let joined = RaNode::new(RaKind::CrossJoin {
            left: left.boxed(),
            right: right.boxed(),
        });
        let schema = joined.check().unwrap();
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn union_rejects_mismatched_arity() {
        let left = RaNode::new(RaKind::Projection {
            child: leaf("R", &["a"]).boxed(),
            columns: vec![ValueExpr::Column {
                name: "a".into(),
                relation_alias: None,
            }],
        });
        let right = RaNode::new(RaKind::Projection {
            child: leaf("S", &["b", "c"]).boxed(),
            columns: vec![
                ValueExpr::Column {
                    name: "b".into(),
                    relation_alias: None,
                },
                ValueExpr::Column {
                    name: "c".into(),
                    relation_alias: None,
                },
            ],
        });
        let unioned = RaNode::new(RaKind::Union {
            left: left.boxed(),
            right: right.boxed(),
        });
        assert!(unioned.check().is_err());
    }

    #[test]
    fn semi_join_preserves_left_schema() {
        let left = leaf("R", &["a", "b"]);
        let right = leaf("S", &["b"]);
        let semi = RaNode::new(RaKind::SemiJoin {
            left: left.boxed(),
            right: right.boxed(),
            preserve: SemiJoinSide::Left,
        });
        assert_eq!(semi.check().unwrap().len(), 2);
    }
}
