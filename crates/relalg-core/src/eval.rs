//! A small reference evaluator over the RA vocabulary.
//!
//! RA evaluation is explicitly out of scope for this crate as a product
//! feature (spec.md §1) — callers evaluate the trees this crate produces
//! with their own engine. This module exists for two narrower reasons:
//!
//! 1. The TRC translator's uncorrelated-existential "gate" (§4.1.4 Case A)
//!    literally evaluates the subformula's cardinality at translation
//!    time (spec.md §9, design note 3) to decide between the `zero`/`all`
//!    branches. That dependency is internal to the translator and only
//!    ever runs over a catalog relation's inline test-fixture rows.
//! 2. The concrete scenarios in spec.md §8.2 are most directly asserted by
//!    running the produced tree and comparing result rows, rather than by
//!    pattern-matching the tree shape.
//!
//! Consequently this evaluator is deliberately minimal: no indexing, no
//! query planning, just a direct recursive interpretation sufficient for
//! small in-memory fixtures.

use crate::catalog::{Column, DataType, Tuple, Value};
use crate::error::TranslateError;
use crate::ra::{JoinCondition, RaKind, RaNode, SemiJoinSide};
use crate::value_expr::{Literal, ValueExpr};

/// The output of evaluating a node: its schema plus its rows.
pub struct EvalResult {
    pub schema: Vec<Column>,
    pub rows: Vec<Tuple>,
}

pub fn eval(node: &RaNode) -> Result<EvalResult, TranslateError> {
    match &node.kind {
        RaKind::Relation { relation } => Ok(EvalResult {
            schema: relation.schema.clone(),
            rows: relation.rows.clone(),
        }),
        RaKind::Projection { child, columns } => {
            let input = eval(child)?;
            let schema = columns
                .iter()
                .map(|c| Column::new(c.display_name(), c.result_type()))
                .collect();
            let rows = input
                .rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| eval_value_expr(c, &input.schema, row))
                        .collect::<Result<Tuple, TranslateError>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(EvalResult {
                schema,
                rows: dedup(rows),
            })
        }
        RaKind::Selection { child, predicate } => {
            let input = eval(child)?;
            let mut rows = Vec::new();
            for row in &input.rows {
                if eval_value_expr(predicate, &input.schema, row)? == Value::Boolean(true) {
                    rows.push(row.clone());
                }
            }
            Ok(EvalResult {
                schema: input.schema,
                rows,
            })
        }
        RaKind::RenameRelation { child, new_alias } => {
            let mut input = eval(child)?;
            for col in &mut input.schema {
                col.relation_alias = Some(new_alias.clone());
            }
            Ok(input)
        }
        RaKind::RenameColumns { child, mapping } => {
            let mut input = eval(child)?;
            for col in &mut input.schema {
                if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == col.name) {
                    col.name = to.clone();
                }
            }
            Ok(input)
        }
        RaKind::OrderBy {
            child,
            columns,
            ascending,
        } => {
            let mut input = eval(child)?;
            let idxs: Vec<usize> = columns
                .iter()
                .filter_map(|name| input.schema.iter().position(|c| &c.name == name))
                .collect();
            input.rows.sort_by(|a, b| {
                for (i, &idx) in idxs.iter().enumerate() {
                    let asc = ascending.get(i).copied().unwrap_or(true);
                    let ord = compare_values(&a[idx], &b[idx]);
                    let ord = if asc { ord } else { ord.reverse() };
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
            Ok(input)
        }
        RaKind::GroupBy {
            child,
            group_columns,
            aggregates,
        } => {
            let input = eval(child)?;
            let idxs: Vec<usize> = group_columns
                .iter()
                .filter_map(|name| input.schema.iter().position(|c| &c.name == name))
                .collect();
            let mut groups: Vec<(Tuple, usize)> = Vec::new();
            for row in &input.rows {
                let key: Tuple = idxs.iter().map(|&i| row[i].clone()).collect();
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, count)) => *count += 1,
                    None => groups.push((key, 1)),
                }
            }
            let mut schema: Vec<Column> = group_columns
                .iter()
                .filter_map(|g| input.schema.iter().find(|c| &c.name == g).cloned())
                .collect();
            schema.extend(
                aggregates
                    .iter()
                    .map(|(alias, _)| Column::new(alias.clone(), DataType::Number)),
            );
            let rows = groups
                .into_iter()
                .map(|(mut key, count)| {
                    for _ in aggregates {
                        key.push(Value::Number(count as f64));
                    }
                    key
                })
                .collect();
            Ok(EvalResult { schema, rows })
        }
        RaKind::CrossJoin { left, right } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let mut schema = l.schema;
            schema.extend(r.schema);
            let mut rows = Vec::new();
            for lr in &l.rows {
                for rr in &r.rows {
                    let mut row = lr.clone();
                    row.extend(rr.clone());
                    rows.push(row);
                }
            }
            Ok(EvalResult { schema, rows })
        }
        RaKind::InnerJoin {
            left,
            right,
            condition,
        } => eval_join(left, right, condition, JoinKind::Inner),
        RaKind::LeftOuterJoin {
            left,
            right,
            condition,
        } => eval_join(left, right, condition, JoinKind::Left),
        RaKind::RightOuterJoin {
            left,
            right,
            condition,
        } => eval_join(left, right, condition, JoinKind::Right),
        RaKind::FullOuterJoin {
            left,
            right,
            condition,
        } => eval_join(left, right, condition, JoinKind::Full),
        RaKind::SemiJoin {
            left,
            right,
            preserve,
        } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let common = common_columns(&l.schema, &r.schema);
            match preserve {
                SemiJoinSide::Left => {
                    let rows = l
                        .rows
                        .into_iter()
                        .filter(|lr| r.rows.iter().any(|rr| rows_match(&l.schema, lr, &r.schema, rr, &common)))
                        .collect();
                    Ok(EvalResult {
                        schema: l.schema,
                        rows,
                    })
                }
                SemiJoinSide::Right => {
                    let rows = r
                        .rows
                        .into_iter()
                        .filter(|rr| l.rows.iter().any(|lr| rows_match(&l.schema, lr, &r.schema, rr, &common)))
                        .collect();
                    Ok(EvalResult {
                        schema: r.schema,
                        rows,
                    })
                }
            }
        }
        RaKind::AntiJoin { left, right, .. } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let common = common_columns(&l.schema, &r.schema);
            let rows = l
                .rows
                .into_iter()
                .filter(|lr| !r.rows.iter().any(|rr| rows_match(&l.schema, lr, &r.schema, rr, &common)))
                .collect();
            Ok(EvalResult {
                schema: l.schema,
                rows,
            })
        }
        RaKind::Union { left, right } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let mut rows = l.rows;
            for row in r.rows {
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
            Ok(EvalResult {
                schema: l.schema,
                rows,
            })
        }
        RaKind::Intersect { left, right } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let rows = l
                .rows
                .into_iter()
                .filter(|row| r.rows.contains(row))
                .collect();
            Ok(EvalResult {
                schema: l.schema,
                rows,
            })
        }
        RaKind::Difference { left, right } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let rows = l
                .rows
                .into_iter()
                .filter(|row| !r.rows.contains(row))
                .collect();
            Ok(EvalResult {
                schema: l.schema,
                rows,
            })
        }
        RaKind::Division { left, right } => {
            let l = eval(left)?;
            let r = eval(right)?;
            let divisor_arity = r.schema.len();
            let result_arity = l.schema.len() - divisor_arity;
            let mut rows = Vec::new();
            for lr in &l.rows {
                let prefix = &lr[..result_arity];
                let dividend_prefixes: Vec<&Tuple> = l
                    .rows
                    .iter()
                    .filter(|row| &row[..result_arity] == prefix)
                    .collect();
                let satisfies_all = r.rows.iter().all(|divisor_row| {
                    dividend_prefixes
                        .iter()
                        .any(|row| &row[result_arity..] == divisor_row.as_slice())
                });
                if satisfies_all && !rows.contains(&prefix.to_vec()) {
                    rows.push(prefix.to_vec());
                }
            }
            Ok(EvalResult {
                schema: l.schema[..result_arity].to_vec(),
                rows,
            })
        }
    }
}

/// Convenience used by the TRC translator's uncorrelated-existential gate:
/// the number of rows the subtree evaluates to.
pub fn cardinality(node: &RaNode) -> Result<usize, TranslateError> {
    Ok(eval(node)?.rows.len())
}

enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

fn eval_join(
    left: &RaNode,
    right: &RaNode,
    condition: &JoinCondition,
    kind: JoinKind,
) -> Result<EvalResult, TranslateError> {
    let l = eval(left)?;
    let r = eval(right)?;
    let mut schema = l.schema.clone();
    schema.extend(r.schema.clone());

    let matches = |lr: &Tuple, rr: &Tuple| -> Result<bool, TranslateError> {
        match condition {
            JoinCondition::Natural {
                restrict_to_columns,
            } => {
                let common = match restrict_to_columns {
                    Some(cols) => cols.clone(),
                    None => common_columns(&l.schema, &r.schema),
                };
                Ok(rows_match(&l.schema, lr, &r.schema, rr, &common))
            }
            JoinCondition::Theta { expression } => {
                let mut combined_schema = l.schema.clone();
                combined_schema.extend(r.schema.clone());
                let mut combined_row = lr.clone();
                combined_row.extend(rr.clone());
                Ok(eval_value_expr(expression, &combined_schema, &combined_row)?
                    == Value::Boolean(true))
            }
        }
    };

    let mut rows = Vec::new();
    let mut right_matched = vec![false; r.rows.len()];
    for lr in &l.rows {
        let mut any = false;
        for (ri, rr) in r.rows.iter().enumerate() {
            if matches(lr, rr)? {
                any = true;
                right_matched[ri] = true;
                let mut row = lr.clone();
                row.extend(rr.clone());
                rows.push(row);
            }
        }
        if !any && matches!(kind, JoinKind::Left | JoinKind::Full) {
            let mut row = lr.clone();
            row.extend(r.schema.iter().map(|_| Value::Null));
            rows.push(row);
        }
    }
    if matches!(kind, JoinKind::Right | JoinKind::Full) {
        for (ri, rr) in r.rows.iter().enumerate() {
            if !right_matched[ri] {
                let mut row: Tuple = l.schema.iter().map(|_| Value::Null).collect();
                row.extend(rr.clone());
                rows.push(row);
            }
        }
    }
    let _ = kind; // Inner needs no extra handling beyond the loop above.
    Ok(EvalResult { schema, rows })
}

fn common_columns(left: &[Column], right: &[Column]) -> Vec<String> {
    left.iter()
        .filter(|l| right.iter().any(|r| r.name == l.name))
        .map(|c| c.name.clone())
        .collect()
}

fn rows_match(
    left_schema: &[Column],
    left_row: &Tuple,
    right_schema: &[Column],
    right_row: &Tuple,
    common: &[String],
) -> bool {
    common.iter().all(|name| {
        let li = left_schema.iter().position(|c| &c.name == name);
        let ri = right_schema.iter().position(|c| &c.name == name);
        match (li, ri) {
            (Some(li), Some(ri)) => left_row[li] == right_row[ri],
            _ => false,
        }
    })
}

fn dedup(mut rows: Vec<Tuple>) -> Vec<Tuple> {
    let mut out: Vec<Tuple> = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        if !out.contains(&row) {
            out.push(row);
        }
    }
    out
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn eval_value_expr(
    expr: &ValueExpr,
    schema: &[Column],
    row: &Tuple,
) -> Result<Value, TranslateError> {
    match expr {
        ValueExpr::Column {
            name,
            relation_alias,
        } => {
            let idx = schema
                .iter()
                .position(|c| {
                    c.name == *name
                        && match relation_alias {
                            Some(alias) => c.relation_alias.as_deref() == Some(alias.as_str()),
                            None => true,
                        }
                })
                .ok_or_else(|| TranslateError::UnsupportedNode {
                    detail: format!("unresolved column `{name}` during evaluation"),
                    code_region: None,
                })?;
            Ok(row[idx].clone())
        }
        ValueExpr::Constant { value, .. } => Ok(match value {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(*n),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Date(s) => Value::String(s.clone()),
        }),
        ValueExpr::Operator { name, args, .. } => {
            let values = args
                .iter()
                .map(|a| eval_value_expr(a, schema, row))
                .collect::<Result<Vec<_>, _>>()?;
            eval_operator(name, &values)
        }
    }
}

fn eval_operator(name: &str, args: &[Value]) -> Result<Value, TranslateError> {
    let unsupported = || TranslateError::UnsupportedNode {
        detail: format!("unsupported operator `{name}` with {} args", args.len()),
        code_region: None,
    };
    match (name, args) {
        ("=", [a, b]) => Ok(Value::Boolean(a == b)),
        ("!=", [a, b]) => Ok(Value::Boolean(a != b)),
        ("<", [a, b]) => Ok(Value::Boolean(compare_values(a, b) == std::cmp::Ordering::Less)),
        ("<=", [a, b]) => Ok(Value::Boolean(
            compare_values(a, b) != std::cmp::Ordering::Greater,
        )),
        (">", [a, b]) => Ok(Value::Boolean(
            compare_values(a, b) == std::cmp::Ordering::Greater,
        )),
        (">=", [a, b]) => Ok(Value::Boolean(
            compare_values(a, b) != std::cmp::Ordering::Less,
        )),
        ("and", [Value::Boolean(a), Value::Boolean(b)]) => Ok(Value::Boolean(*a && *b)),
        ("or", [Value::Boolean(a), Value::Boolean(b)]) => Ok(Value::Boolean(*a || *b)),
        ("not", [Value::Boolean(a)]) => Ok(Value::Boolean(!a)),
        ("+", [Value::Number(a), Value::Number(b)]) => Ok(Value::Number(a + b)),
        ("-", [Value::Number(a), Value::Number(b)]) => Ok(Value::Number(a - b)),
        ("*", [Value::Number(a), Value::Number(b)]) => Ok(Value::Number(a * b)),
        ("/", [Value::Number(a), Value::Number(b)]) => Ok(Value::Number(a / b)),
        ("neg", [Value::Number(a)]) => Ok(Value::Number(-a)),
        ("pos", [Value::Number(a)]) => Ok(Value::Number(*a)),
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Relation;
    use crate::ra::RaNode;

    fn relation(name: &str, cols: &[&str], rows: Vec<Vec<Value>>) -> RaNode {
        let schema = cols.iter().map(|c| Column::new(*c, DataType::Number)).collect();
        RaNode::new(RaKind::Relation {
            relation: Relation::new(name, schema).with_rows(rows),
        })
    }

    #[test]
    fn selection_filters_rows() {
        let r = relation(
            "R",
            &["a"],
            vec![vec![Value::Number(1.0)], vec![Value::Number(5.0)]],
        );
        let predicate = ValueExpr::boolean_op(
            ">",
            vec![
                ValueExpr::column("a", None),
                ValueExpr::Constant {
                    data_type: DataType::Number,
                    value: Literal::Number(3.0),
                },
            ],
        );
        let node = RaNode::new(RaKind::Selection {
            child: r.boxed(),
            predicate,
        });
        let result = eval(&node).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Number(5.0)]]);
    }

    #[test]
    fn cardinality_counts_rows() {
        let r = relation(
            "R",
            &["a"],
            vec![vec![Value::Number(1.0)], vec![Value::Number(2.0)]],
        );
        assert_eq!(cardinality(&r).unwrap(), 2);
    }

    #[test]
    fn difference_removes_matching_rows() {
        let r = relation(
            "R",
            &["a"],
            vec![vec![Value::Number(1.0)], vec![Value::Number(2.0)]],
        );
        let s = relation("S", &["a"], vec![vec![Value::Number(1.0)]]);
        let node = RaNode::new(RaKind::Difference {
            left: r.boxed(),
            right: s.boxed(),
        });
        let result = eval(&node).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Number(2.0)]]);
    }
}
