//! SQL-to-RA translation (C7a): a structural walk over a `sqlparser` AST
//! that shares the RA vocabulary (C1), value-expression lowering (C2), and
//! join-condition decoder (C6) with the TRC translator. This is the
//! straightforward external collaborator spec.md §4.2 describes — not the
//! load-bearing subsystem C5 is.

use sqlparser::ast::{
    Distinct, GroupByExpr, Join, JoinConstraint, JoinOperator, OrderByExpr, Query, Select,
    SelectItem, SetExpr, SetOperator, SetQuantifier, Statement, TableFactor, TableWithJoins,
};
#[cfg(feature = "tracing")]
use tracing::warn;

use crate::catalog::{Catalog, DataType};
use crate::dialect::SqlDialect;
use crate::error::TranslateError;
use crate::join_condition::{self, JoinConditionSyntax};
use crate::options::TranslateOptions;
use crate::parser::parse_sql_with_dialect;
use crate::ra::{JoinCondition, RaKind, RaNode, Warning};
use crate::value_expr::{lower_sql_expr, Literal, ValueExpr};

/// Translates a single SQL statement (the first one found in `sql`) into
/// an RA tree, plus any non-fatal warnings accumulated along the way
/// (spec.md §4.2, §6.4).
pub fn translate_sql(
    sql: &str,
    dialect: SqlDialect,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
) -> Result<(RaNode, Vec<Warning>), TranslateError> {
    let statements = parse_sql_with_dialect(sql, dialect)?;
    let statement = statements
        .first()
        .ok_or_else(|| TranslateError::UnsupportedNode {
            detail: "no statement found".to_string(),
            code_region: None,
        })?;

    let mut warnings = Vec::new();
    let tree = match statement {
        Statement::Query(query) => translate_query(query, catalog, opts, &mut warnings)?,
        other => {
            return Err(TranslateError::UnsupportedNode {
                detail: format!("unsupported statement kind: {other}"),
                code_region: None,
            })
        }
    };
    Ok((tree, warnings))
}

fn translate_query(
    query: &Query,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    let mut tree = translate_set_expr(&query.body, catalog, opts, warnings)?;

    let order_by_exprs = query.order_by.as_ref().map(|o| o.exprs.as_slice()).unwrap_or(&[]);
    if !order_by_exprs.is_empty() {
        tree = apply_order_by(tree, order_by_exprs)?;
    }

    let limit = query
        .limit
        .as_ref()
        .map(lower_sql_expr)
        .transpose()
        .map_err(|detail| TranslateError::UnsupportedNode {
            detail,
            code_region: None,
        })?
        .map(|expr| literal_number(&expr))
        .transpose()?;
    let offset = query
        .offset
        .as_ref()
        .map(|o| lower_sql_expr(&o.value))
        .transpose()
        .map_err(|detail| TranslateError::UnsupportedNode {
            detail,
            code_region: None,
        })?
        .map(|expr| literal_number(&expr))
        .transpose()?
        .unwrap_or(0.0);

    if limit.is_some() || offset != 0.0 {
        if limit.is_some() && order_by_exprs.is_empty() {
            push_warning(
                warnings,
                "LIMIT without ORDER BY: row selection is not deterministic under set semantics",
            );
        }
        tree = apply_limit_offset(tree, limit, offset);
    }

    Ok(tree)
}

fn literal_number(expr: &ValueExpr) -> Result<f64, TranslateError> {
    match expr {
        ValueExpr::Constant {
            value: Literal::Number(n),
            ..
        } => Ok(*n),
        other => Err(TranslateError::UnsupportedNode {
            detail: format!("expected a numeric literal, found {other:?}"),
            code_region: None,
        }),
    }
}

/// Lowers `LIMIT n OFFSET k` to a `Selection` on a synthetic `rownum`
/// value-expression (spec.md §4.2): `rownum > k ∧ rownum ≤ n+k`. `rownum`
/// is modelled as a virtual, unqualified column; evaluating it is a
/// concern for whatever engine runs the produced tree, not this crate
/// (RA evaluation is out of scope, spec.md §1).
fn apply_limit_offset(child: RaNode, limit: Option<f64>, offset: f64) -> RaNode {
    let rownum = ValueExpr::column("rownum", None);
    let number = |n: f64| ValueExpr::Constant {
        data_type: DataType::Number,
        value: Literal::Number(n),
    };
    let lower = ValueExpr::boolean_op(">", vec![rownum.clone(), number(offset)]);
    let predicate = match limit {
        Some(n) => {
            let upper = ValueExpr::boolean_op("<=", vec![rownum, number(n + offset)]);
            ValueExpr::boolean_op("and", vec![lower, upper])
        }
        None => lower,
    };
    RaNode::new(RaKind::Selection {
        child: child.boxed(),
        predicate,
    })
}

fn apply_order_by(child: RaNode, order_by: &[OrderByExpr]) -> Result<RaNode, TranslateError> {
    let mut columns = Vec::with_capacity(order_by.len());
    let mut ascending = Vec::with_capacity(order_by.len());
    for item in order_by {
        let lowered = lower_sql_expr(&item.expr).map_err(|detail| TranslateError::UnsupportedNode {
            detail,
            code_region: None,
        })?;
        columns.push(lowered.display_name());
        ascending.push(item.asc.unwrap_or(true));
    }
    Ok(RaNode::new(RaKind::OrderBy {
        child: child.boxed(),
        columns,
        ascending,
    }))
}

fn translate_set_expr(
    body: &SetExpr,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    match body {
        SetExpr::Select(select) => translate_select(select, catalog, opts, warnings),
        SetExpr::Query(query) => translate_query(query, catalog, opts, warnings),
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } => {
            let _ = set_quantifier; // ALL accepted syntactically, treated as set semantics (spec.md §4.2).
            let l = translate_set_expr(left, catalog, opts, warnings)?;
            let r = translate_set_expr(right, catalog, opts, warnings)?;
            let kind = match op {
                SetOperator::Union => RaKind::Union {
                    left: l.boxed(),
                    right: r.boxed(),
                },
                SetOperator::Intersect => RaKind::Intersect {
                    left: l.boxed(),
                    right: r.boxed(),
                },
                SetOperator::Except => RaKind::Difference {
                    left: l.boxed(),
                    right: r.boxed(),
                },
            };
            Ok(RaNode::new(kind))
        }
        other => Err(TranslateError::UnsupportedNode {
            detail: format!("unsupported query body: {other}"),
            code_region: None,
        }),
    }
}

fn translate_select(
    select: &Select,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    if select.from.is_empty() {
        return Err(TranslateError::UnsupportedNode {
            detail: "SELECT without FROM".to_string(),
            code_region: None,
        });
    }

    let mut tree = translate_from(&select.from, catalog, opts, warnings)?;

    if let Some(selection) = &select.selection {
        let predicate =
            lower_sql_expr(selection).map_err(|detail| TranslateError::UnsupportedNode {
                detail,
                code_region: None,
            })?;
        tree = RaNode::new(RaKind::Selection {
            child: tree.boxed(),
            predicate,
        });
    }

    let group_columns = group_by_columns(&select.group_by)?;
    let aggregates = if group_columns.is_empty() {
        Vec::new()
    } else {
        extract_aggregates(&select.projection)
    };
    if !group_columns.is_empty() {
        tree = RaNode::new(RaKind::GroupBy {
            child: tree.boxed(),
            group_columns,
            aggregates,
        });
        if let Some(having) = &select.having {
            let predicate =
                lower_sql_expr(having).map_err(|detail| TranslateError::UnsupportedNode {
                    detail,
                    code_region: None,
                })?;
            tree = RaNode::new(RaKind::Selection {
                child: tree.boxed(),
                predicate,
            });
        }
    }

    if !is_not_distinct(&select.distinct) && opts.warn_on_non_distinct_select {
        push_warning(
            warnings,
            "SELECT without DISTINCT: bag semantics cannot be preserved under this crate's set-semantics RA",
        );
    }

    if !is_star_only(&select.projection) {
        let columns = select
            .projection
            .iter()
            .map(lower_select_item)
            .collect::<Result<Vec<_>, _>>()?;
        tree = RaNode::new(RaKind::Projection {
            child: tree.boxed(),
            columns,
        });
    }

    Ok(tree)
}

fn is_not_distinct(distinct: &Option<Distinct>) -> bool {
    matches!(distinct, Some(Distinct::Distinct))
}

fn is_star_only(projection: &[SelectItem]) -> bool {
    matches!(projection, [SelectItem::Wildcard(_)])
}

fn lower_select_item(item: &SelectItem) -> Result<ValueExpr, TranslateError> {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
            lower_sql_expr(expr).map_err(|detail| TranslateError::UnsupportedNode {
                detail,
                code_region: None,
            })
        }
        other => Err(TranslateError::UnsupportedNode {
            detail: format!("unsupported select item: {other}"),
            code_region: None,
        }),
    }
}

fn group_by_columns(group_by: &GroupByExpr) -> Result<Vec<String>, TranslateError> {
    match group_by {
        GroupByExpr::Expressions(exprs, _) => exprs
            .iter()
            .map(|e| {
                lower_sql_expr(e)
                    .map(|v| v.display_name())
                    .map_err(|detail| TranslateError::UnsupportedNode {
                        detail,
                        code_region: None,
                    })
            })
            .collect(),
        GroupByExpr::All(_) => Err(TranslateError::UnsupportedNode {
            detail: "GROUP BY ALL is not supported".to_string(),
            code_region: None,
        }),
    }
}

/// Extracts `(alias, function_name)` pairs for aggregate calls appearing
/// directly in the `SELECT` list, used to populate `GroupBy`'s
/// `aggregates`. Anything more elaborate than a bare aggregate function
/// call is out of scope (spec.md §1's "not the interesting work").
fn extract_aggregates(projection: &[SelectItem]) -> Vec<(String, String)> {
    projection
        .iter()
        .filter_map(|item| {
            let (expr, alias) = match item {
                SelectItem::UnnamedExpr(expr) => (expr, None),
                SelectItem::ExprWithAlias { expr, alias } => (expr, Some(alias.value.clone())),
                _ => return None,
            };
            match expr {
                sqlparser::ast::Expr::Function(func) => {
                    let name = func.name.to_string().to_lowercase();
                    let alias = alias.unwrap_or_else(|| name.clone());
                    Some((alias, name))
                }
                _ => None,
            }
        })
        .collect()
}

fn translate_from(
    from: &[TableWithJoins],
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    let mut items = from
        .iter()
        .map(|twj| translate_table_with_joins(twj, catalog, opts, warnings));
    let mut tree = items.next().expect("checked non-empty above")?;
    for item in items {
        let right = item?;
        tree = cross_join(tree, right, opts, warnings);
    }
    Ok(tree)
}

fn translate_table_with_joins(
    twj: &TableWithJoins,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    let mut tree = translate_table_factor(&twj.relation, catalog, opts, warnings)?;
    for join in &twj.joins {
        tree = translate_join(tree, join, catalog, opts, warnings)?;
    }
    Ok(tree)
}

fn translate_table_factor(
    factor: &TableFactor,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let relation_name = name
                .0
                .last()
                .map(|ident| ident.value.clone())
                .ok_or_else(|| TranslateError::UnsupportedNode {
                    detail: "empty table name".to_string(),
                    code_region: None,
                })?;
            let relation = catalog
                .lookup(&relation_name)
                .ok_or_else(|| TranslateError::UnknownRelation {
                    name: relation_name.clone(),
                    code_region: None,
                })?;
            let mut node = RaNode::new(RaKind::Relation { relation });
            if let Some(alias) = alias {
                node = RaNode::new(RaKind::RenameRelation {
                    child: node.boxed(),
                    new_alias: alias.name.value.clone(),
                });
            }
            Ok(node)
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let mut node = translate_query(subquery, catalog, opts, warnings)?;
            if let Some(alias) = alias {
                node = RaNode::new(RaKind::RenameRelation {
                    child: node.boxed(),
                    new_alias: alias.name.value.clone(),
                });
            }
            Ok(node)
        }
        other => Err(TranslateError::UnsupportedNode {
            detail: format!("unsupported FROM item: {other}"),
            code_region: None,
        }),
    }
}

fn translate_join(
    left: RaNode,
    join: &Join,
    catalog: &dyn Catalog,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> Result<RaNode, TranslateError> {
    let right = translate_table_factor(&join.relation, catalog, opts, warnings)?;
    match &join.join_operator {
        JoinOperator::CrossJoin => Ok(cross_join(left, right, opts, warnings)),
        JoinOperator::Inner(constraint) => {
            let condition = decode_constraint(constraint)?;
            Ok(RaNode::new(RaKind::InnerJoin {
                left: left.boxed(),
                right: right.boxed(),
                condition,
            }))
        }
        JoinOperator::LeftOuter(constraint) => {
            let condition = decode_constraint(constraint)?;
            Ok(RaNode::new(RaKind::LeftOuterJoin {
                left: left.boxed(),
                right: right.boxed(),
                condition,
            }))
        }
        JoinOperator::RightOuter(constraint) => {
            let condition = decode_constraint(constraint)?;
            Ok(RaNode::new(RaKind::RightOuterJoin {
                left: left.boxed(),
                right: right.boxed(),
                condition,
            }))
        }
        JoinOperator::FullOuter(constraint) => {
            let condition = decode_constraint(constraint)?;
            Ok(RaNode::new(RaKind::FullOuterJoin {
                left: left.boxed(),
                right: right.boxed(),
                condition,
            }))
        }
        other => Err(TranslateError::UnsupportedNode {
            detail: format!("unsupported join operator: {other:?}"),
            code_region: None,
        }),
    }
}

fn decode_constraint(constraint: &JoinConstraint) -> Result<JoinCondition, TranslateError> {
    let syntax = match constraint {
        JoinConstraint::On(expr) => JoinConditionSyntax::Expression(expr),
        JoinConstraint::Using(cols) => {
            return Ok(JoinCondition::Natural {
                restrict_to_columns: Some(cols.iter().map(|c| c.to_string()).collect()),
            })
        }
        JoinConstraint::Natural | JoinConstraint::None => JoinConditionSyntax::Null,
    };
    join_condition::decode(syntax).map_err(|detail| TranslateError::UnsupportedNode {
        detail,
        code_region: None,
    })
}

fn cross_join(
    left: RaNode,
    right: RaNode,
    opts: &TranslateOptions,
    warnings: &mut Vec<Warning>,
) -> RaNode {
    if let (Some(l), Some(r)) = (estimate_rows(&left), estimate_rows(&right)) {
        if l.saturating_mul(r) > opts.cross_join_warning_threshold {
            push_warning(
                warnings,
                format!(
                    "cross join estimated at {l}x{r} rows exceeds the {} row warning threshold",
                    opts.cross_join_warning_threshold
                ),
            );
        }
    }
    RaNode::new(RaKind::CrossJoin {
        left: left.boxed(),
        right: right.boxed(),
    })
}

/// Best-effort row-count estimate used only for the oversized-cross-join
/// warning; returns `None` whenever the node isn't a catalog leaf (or a
/// pass-through of one), since this crate does not otherwise estimate
/// cardinality (spec.md §1 Non-goals: no cost estimation).
fn estimate_rows(node: &RaNode) -> Option<u64> {
    match &node.kind {
        RaKind::Relation { relation } => Some(relation.rows.len() as u64),
        RaKind::Selection { child, .. }
        | RaKind::Projection { child, .. }
        | RaKind::RenameRelation { child, .. }
        | RaKind::RenameColumns { child, .. } => estimate_rows(child),
        RaKind::CrossJoin { left, right } => {
            Some(estimate_rows(left)? * estimate_rows(right)?)
        }
        _ => None,
    }
}

fn push_warning(warnings: &mut Vec<Warning>, message: impl Into<String>) {
    let message = message.into();
    #[cfg(feature = "tracing")]
    warn!(%message, "sql translator warning");
    warnings.push(Warning {
        message,
        code_region: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType as Dt, InMemoryCatalog, Relation, Value};

    fn catalog() -> InMemoryCatalog {
        let r = Relation::new(
            "r",
            vec![Column::new("a", Dt::Number), Column::new("b", Dt::Number)],
        )
        .with_rows(vec![
            vec![Value::Number(1.0), Value::Number(2.0)],
            vec![Value::Number(3.0), Value::Number(4.0)],
        ]);
        let s = Relation::new("s", vec![Column::new("b", Dt::Number)])
            .with_rows(vec![vec![Value::Number(2.0)]]);
        InMemoryCatalog::new().with_relation(r).with_relation(s)
    }

    #[test]
    fn select_star_from_single_table_is_identity() {
        let (tree, _warnings) = translate_sql(
            "SELECT * FROM r",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert!(matches!(tree.kind, RaKind::Relation { .. }));
    }

    #[test]
    fn select_without_distinct_warns() {
        let (_tree, warnings) = translate_sql(
            "SELECT a FROM r",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn where_clause_lowers_to_selection() {
        let (tree, _warnings) = translate_sql(
            "SELECT * FROM r WHERE a > 1",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert!(matches!(tree.kind, RaKind::Selection { .. }));
    }

    #[test]
    fn inner_join_on_lowers_to_theta_join() {
        let (tree, _warnings) = translate_sql(
            "SELECT * FROM r JOIN s ON r.b = s.b",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            tree.kind,
            RaKind::InnerJoin {
                condition: JoinCondition::Theta { .. },
                ..
            }
        ));
    }

    #[test]
    fn union_lowers_to_union_node() {
        let (tree, _warnings) = translate_sql(
            "SELECT a FROM r UNION SELECT b FROM s",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        )
        .unwrap();
        assert!(matches!(tree.kind, RaKind::Union { .. }));
    }

    #[test]
    fn unknown_relation_is_reported() {
        let result = translate_sql(
            "SELECT * FROM missing",
            SqlDialect::Generic,
            &catalog(),
            &TranslateOptions::default(),
        );
        assert!(matches!(
            result,
            Err(TranslateError::UnknownRelation { .. })
        ));
    }
}
