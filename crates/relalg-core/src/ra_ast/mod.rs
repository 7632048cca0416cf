//! RA-AST input and its identity translator (C7b).
//!
//! The native RA AST mirrors [`crate::ra::RaKind`] one-for-one, except a
//! leaf names a relation (`relation: String`) rather than embedding one —
//! resolving that name against the catalog is the one piece of real work
//! this translator does. Everything else is a structural walk that swaps
//! `RaAst` nodes for `RaNode` nodes, sharing C1's vocabulary and C6's
//! join-condition decoder with the SQL translator.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::TranslateError;
use crate::ra::{CodeRegion, JoinCondition, RaKind, RaNode, SemiJoinSide, Warning};
use crate::value_expr::ValueExpr;

/// The as-parsed native RA tree (C7b's input shape). Carries the same
/// optional code-region tag as every other AST this crate accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaAst {
    pub kind: RaAstKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_region: Option<CodeRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RaAstKind {
    Relation {
        relation: String,
    },
    Projection {
        child: Box<RaAst>,
        columns: Vec<ValueExpr>,
    },
    Selection {
        child: Box<RaAst>,
        predicate: ValueExpr,
    },
    RenameRelation {
        child: Box<RaAst>,
        new_alias: String,
    },
    RenameColumns {
        child: Box<RaAst>,
        mapping: Vec<(String, String)>,
    },
    OrderBy {
        child: Box<RaAst>,
        columns: Vec<String>,
        ascending: Vec<bool>,
    },
    GroupBy {
        child: Box<RaAst>,
        group_columns: Vec<String>,
        aggregates: Vec<(String, String)>,
    },
    CrossJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
    },
    InnerJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        condition: JoinCondition,
    },
    LeftOuterJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        condition: JoinCondition,
    },
    RightOuterJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        condition: JoinCondition,
    },
    FullOuterJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        condition: JoinCondition,
    },
    SemiJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        preserve: SemiJoinSide,
    },
    AntiJoin {
        left: Box<RaAst>,
        right: Box<RaAst>,
        condition: Option<JoinCondition>,
    },
    Union {
        left: Box<RaAst>,
        right: Box<RaAst>,
    },
    Intersect {
        left: Box<RaAst>,
        right: Box<RaAst>,
    },
    Difference {
        left: Box<RaAst>,
        right: Box<RaAst>,
    },
    Division {
        left: Box<RaAst>,
        right: Box<RaAst>,
    },
}

/// Translates a native RA AST into an [`RaNode`] tree. Since the input is
/// already shaped like the output, this never fails except on an unknown
/// relation name, and never raises a warning — the `Vec<Warning>` exists
/// only for interface parity with `translate_sql`/`translate_trc`
/// (spec.md §6.1: "three entry points... all return the same vocabulary").
pub fn translate_ra_ast(
    ast: &RaAst,
    catalog: &dyn Catalog,
) -> Result<(RaNode, Vec<Warning>), TranslateError> {
    let tree = walk(ast, catalog)?;
    Ok((tree, Vec::new()))
}

fn walk(ast: &RaAst, catalog: &dyn Catalog) -> Result<RaNode, TranslateError> {
    let kind = match &ast.kind {
        RaAstKind::Relation { relation } => {
            let relation = catalog
                .lookup(relation)
                .ok_or_else(|| TranslateError::UnknownRelation {
                    name: relation.clone(),
                    code_region: ast.code_region,
                })?;
            RaKind::Relation { relation }
        }
        RaAstKind::Projection { child, columns } => RaKind::Projection {
            child: walk(child, catalog)?.boxed(),
            columns: columns.clone(),
        },
        RaAstKind::Selection { child, predicate } => RaKind::Selection {
            child: walk(child, catalog)?.boxed(),
            predicate: predicate.clone(),
        },
        RaAstKind::RenameRelation { child, new_alias } => RaKind::RenameRelation {
            child: walk(child, catalog)?.boxed(),
            new_alias: new_alias.clone(),
        },
        RaAstKind::RenameColumns { child, mapping } => RaKind::RenameColumns {
            child: walk(child, catalog)?.boxed(),
            mapping: mapping.clone(),
        },
        RaAstKind::OrderBy {
            child,
            columns,
            ascending,
        } => RaKind::OrderBy {
            child: walk(child, catalog)?.boxed(),
            columns: columns.clone(),
            ascending: ascending.clone(),
        },
        RaAstKind::GroupBy {
            child,
            group_columns,
            aggregates,
        } => RaKind::GroupBy {
            child: walk(child, catalog)?.boxed(),
            group_columns: group_columns.clone(),
            aggregates: aggregates.clone(),
        },
        RaAstKind::CrossJoin { left, right } => RaKind::CrossJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
        },
        RaAstKind::InnerJoin {
            left,
            right,
            condition,
        } => RaKind::InnerJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            condition: condition.clone(),
        },
        RaAstKind::LeftOuterJoin {
            left,
            right,
            condition,
        } => RaKind::LeftOuterJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            condition: condition.clone(),
        },
        RaAstKind::RightOuterJoin {
            left,
            right,
            condition,
        } => RaKind::RightOuterJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            condition: condition.clone(),
        },
        RaAstKind::FullOuterJoin {
            left,
            right,
            condition,
        } => RaKind::FullOuterJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            condition: condition.clone(),
        },
        RaAstKind::SemiJoin {
            left,
            right,
            preserve,
        } => RaKind::SemiJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            preserve: *preserve,
        },
        RaAstKind::AntiJoin {
            left,
            right,
            condition,
        } => RaKind::AntiJoin {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
            condition: condition.clone(),
        },
        RaAstKind::Union { left, right } => RaKind::Union {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
        },
        RaAstKind::Intersect { left, right } => RaKind::Intersect {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
        },
        RaAstKind::Difference { left, right } => RaKind::Difference {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
        },
        RaAstKind::Division { left, right } => RaKind::Division {
            left: walk(left, catalog)?.boxed(),
            right: walk(right, catalog)?.boxed(),
        },
    };
    Ok(RaNode::new(kind).with_code_region(ast.code_region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType, InMemoryCatalog, Relation};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new().with_relation(Relation::new(
            "r",
            vec![Column::new("a", DataType::Number)],
        ))
    }

    fn leaf(relation: &str) -> RaAst {
        RaAst {
            kind: RaAstKind::Relation {
                relation: relation.to_string(),
            },
            code_region: None,
        }
    }

    #[test]
    fn relation_leaf_resolves_against_catalog() {
        let (tree, warnings) = translate_ra_ast(&leaf("r"), &catalog()).unwrap();
        assert!(matches!(tree.kind, RaKind::Relation { .. }));
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_relation_is_reported() {
        let result = translate_ra_ast(&leaf("missing"), &catalog());
        assert!(matches!(result, Err(TranslateError::UnknownRelation { .. })));
    }

    #[test]
    fn selection_wraps_resolved_child() {
        let ast = RaAst {
            kind: RaAstKind::Selection {
                child: Box::new(leaf("r")),
                predicate: ValueExpr::boolean_op(
                    ">",
                    vec![
                        ValueExpr::column("a", None),
                        ValueExpr::Constant {
                            data_type: DataType::Number,
                            value: crate::value_expr::Literal::Number(3.0),
                        },
                    ],
                ),
            },
            code_region: None,
        };
        let (tree, _) = translate_ra_ast(&ast, &catalog()).unwrap();
        assert!(matches!(tree.kind, RaKind::Selection { .. }));
        assert_eq!(tree.check().unwrap().len(), 1);
    }
}
