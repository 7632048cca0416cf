//! Fuzz target for the TRC translator.
//!
//! Builds a depth-bounded, well-typed random TRC formula (deriving
//! `Arbitrary` directly on the recursive AST would happily explode to
//! unbounded depth) and asserts `translate_trc()` never panics -
//! malformed formulas should come back as a `TranslateError`, not a
//! crash.

#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use relalg_core::catalog::{Column, DataType, InMemoryCatalog, Relation};
use relalg_core::options::TranslateOptions;
use relalg_core::trc::{AttrRef, CompareOp, Formula, LogicalOp, Quantifier, RightOperand, TrcExpr};
use relalg_core::translate_trc;
use relalg_core::value_expr::Literal;

const MAX_DEPTH: u8 = 4;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_relation(Relation::new(
            "R",
            vec![Column::new("a", DataType::Number), Column::new("b", DataType::String)],
        ))
        .with_relation(Relation::new("S", vec![Column::new("d", DataType::Number)]))
}

fn variable(u: &mut Unstructured) -> arbitrary::Result<&'static str> {
    Ok(if u.arbitrary::<bool>()? { "t" } else { "s" })
}

fn attribute(u: &mut Unstructured) -> arbitrary::Result<&'static str> {
    Ok(match u.int_in_range(0..=2)? {
        0 => "a",
        1 => "b",
        _ => "d",
    })
}

fn compare_op(u: &mut Unstructured) -> arbitrary::Result<CompareOp> {
    Ok(match u.int_in_range(0..=5)? {
        0 => CompareOp::Eq,
        1 => CompareOp::NotEq,
        2 => CompareOp::Lt,
        3 => CompareOp::Gt,
        4 => CompareOp::Le,
        _ => CompareOp::Ge,
    })
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    if let Ok(ast) = build_trc_expr(&mut u) {
        let _ = translate_trc(&ast, &catalog(), &TranslateOptions::default());
    }
});

fn build_trc_expr(u: &mut Unstructured) -> arbitrary::Result<TrcExpr> {
    let outer_var = variable(u)?;
    let outer_relation = if outer_var == "t" { "R" } else { "S" };
    let base = Formula::RelationPredicate {
        variable: outer_var.to_string(),
        relation: outer_relation.to_string(),
        code_region: None,
    };
    let rest = build_formula(u, outer_var, 0)?;
    Ok(TrcExpr {
        variable: outer_var.to_string(),
        projections: Vec::new(),
        formula: Box::new(Formula::LogicalExpression {
            operator: LogicalOp::And,
            left: Box::new(base),
            right: Box::new(rest),
            code_region: None,
        }),
        code_region: None,
    })
}

fn build_formula(u: &mut Unstructured, bound_var: &str, depth: u8) -> arbitrary::Result<Formula> {
    if depth >= MAX_DEPTH || u.is_empty() {
        return build_predicate(u, bound_var);
    }

    match u.int_in_range(0..=4u8)? {
        0 => build_predicate(u, bound_var),
        1 => Ok(Formula::Negation {
            formula: Box::new(build_formula(u, bound_var, depth + 1)?),
            code_region: None,
        }),
        2 => {
            let operator = match u.int_in_range(0..=2)? {
                0 => LogicalOp::And,
                1 => LogicalOp::Or,
                _ => LogicalOp::Implies,
            };
            Ok(Formula::LogicalExpression {
                operator,
                left: Box::new(build_formula(u, bound_var, depth + 1)?),
                right: Box::new(build_formula(u, bound_var, depth + 1)?),
                code_region: None,
            })
        }
        3 => {
            let quantifier = if u.arbitrary::<bool>()? {
                Quantifier::Exists
            } else {
                Quantifier::ForAll
            };
            let inner_var = if bound_var == "t" { "s" } else { "t" };
            let inner_relation = if inner_var == "t" { "R" } else { "S" };
            let predicate = Formula::RelationPredicate {
                variable: inner_var.to_string(),
                relation: inner_relation.to_string(),
                code_region: None,
            };
            let conjunct = build_formula(u, inner_var, depth + 1)?;
            Ok(Formula::QuantifiedExpression {
                quantifier,
                variable: inner_var.to_string(),
                formula: Box::new(Formula::LogicalExpression {
                    operator: LogicalOp::And,
                    left: Box::new(predicate),
                    right: Box::new(conjunct),
                    code_region: None,
                }),
                code_region: None,
            })
        }
        _ => build_predicate(u, bound_var),
    }
}

fn build_predicate(u: &mut Unstructured, bound_var: &str) -> arbitrary::Result<Formula> {
    let attr = attribute(u)?;
    let op = compare_op(u)?;
    let right = if u.arbitrary::<bool>()? {
        RightOperand::Attr(AttrRef {
            variable: bound_var.to_string(),
            attribute: attribute(u)?.to_string(),
        })
    } else {
        RightOperand::Literal {
            data_type: DataType::Number,
            value: Literal::Number(u.int_in_range(-1000i64..=1000)? as f64),
        }
    };
    Ok(Formula::Predicate {
        left: AttrRef {
            variable: bound_var.to_string(),
            attribute: attr.to_string(),
        },
        operator: op,
        right,
        code_region: None,
    })
}
