//! Property-based tests for the TRC translator's rewrite laws (P2-P5).

use proptest::prelude::*;
use relalg_core::catalog::{Column, DataType, InMemoryCatalog, Relation, Value};
use relalg_core::eval;
use relalg_core::options::TranslateOptions;
use relalg_core::trc::{AttrRef, CompareOp, Formula, LogicalOp, Quantifier, RightOperand, TrcExpr};
use relalg_core::translate_trc;
use relalg_core::value_expr::Literal;

fn catalog() -> InMemoryCatalog {
    let r = Relation::new("R", vec![Column::new("a", DataType::Number)]).with_rows(
        (1..=10)
            .map(|n| vec![Value::Number(n as f64)])
            .collect::<Vec<_>>(),
    );
    let s = Relation::new("S", vec![Column::new("d", DataType::Number)]).with_rows(
        (1..=5)
            .map(|n| vec![Value::Number(n as f64)])
            .collect::<Vec<_>>(),
    );
    InMemoryCatalog::new().with_relation(r).with_relation(s)
}

fn attr(v: &str, a: &str) -> AttrRef {
    AttrRef {
        variable: v.to_string(),
        attribute: a.to_string(),
    }
}

fn relation_predicate(v: &str, r: &str) -> Formula {
    Formula::RelationPredicate {
        variable: v.to_string(),
        relation: r.to_string(),
        code_region: None,
    }
}

fn compare(v: &str, attribute: &str, op: CompareOp, n: f64) -> Formula {
    Formula::Predicate {
        left: attr(v, attribute),
        operator: op,
        right: RightOperand::Literal {
            data_type: DataType::Number,
            value: Literal::Number(n),
        },
        code_region: None,
    }
}

fn and(left: Formula, right: Formula) -> Formula {
    Formula::LogicalExpression {
        operator: LogicalOp::And,
        left: Box::new(left),
        right: Box::new(right),
        code_region: None,
    }
}

fn or(left: Formula, right: Formula) -> Formula {
    Formula::LogicalExpression {
        operator: LogicalOp::Or,
        left: Box::new(left),
        right: Box::new(right),
        code_region: None,
    }
}

fn not(formula: Formula) -> Formula {
    Formula::Negation {
        formula: Box::new(formula),
        code_region: None,
    }
}

fn expr(formula: Formula) -> TrcExpr {
    TrcExpr {
        variable: "t".to_string(),
        projections: Vec::new(),
        formula: Box::new(and(relation_predicate("t", "R"), formula)),
        code_region: None,
    }
}

fn result_a_values(ast: &TrcExpr) -> Vec<i64> {
    let (tree, _) = translate_trc(ast, &catalog(), &TranslateOptions::default()).unwrap();
    let result = eval::eval(&tree).unwrap();
    let mut values: Vec<i64> = result
        .rows
        .iter()
        .map(|row| match &row[0] {
            Value::Number(n) => *n as i64,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect();
    values.sort_unstable();
    values
}

fn compare_op(tag: u8) -> CompareOp {
    match tag % 4 {
        0 => CompareOp::Lt,
        1 => CompareOp::Le,
        2 => CompareOp::Gt,
        _ => CompareOp::Ge,
    }
}

proptest! {
    /// P2: double negation is the identity.
    #[test]
    fn double_negation_is_identity(op_tag in 0u8..4, threshold in 1i64..10) {
        let p = compare("t", "a", compare_op(op_tag), threshold as f64);
        let plain = expr(p.clone());
        let double_negated = expr(not(not(p)));

        prop_assert_eq!(result_a_values(&plain), result_a_values(&double_negated));
    }

    /// P3: De Morgan over conjunction.
    #[test]
    fn de_morgan_over_conjunction(
        left_tag in 0u8..4, left_threshold in 1i64..10,
        right_tag in 0u8..4, right_threshold in 1i64..10,
    ) {
        let p = compare("t", "a", compare_op(left_tag), left_threshold as f64);
        let q = compare("t", "a", compare_op(right_tag), right_threshold as f64);

        let negated_conjunction = expr(not(and(p.clone(), q.clone())));
        let disjunction_of_negations = expr(or(not(p), not(q)));

        prop_assert_eq!(
            result_a_values(&negated_conjunction),
            result_a_values(&disjunction_of_negations)
        );
    }

    /// P4: forall/exists duality, `forall v Phi == not exists v not Phi`.
    #[test]
    fn forall_exists_duality(op_tag in 0u8..4, threshold in 1i64..6) {
        let inner = compare("s", "d", compare_op(op_tag), threshold as f64);

        let for_all = expr(Formula::QuantifiedExpression {
            quantifier: Quantifier::ForAll,
            variable: "s".to_string(),
            formula: Box::new(Formula::LogicalExpression {
                operator: LogicalOp::Implies,
                left: Box::new(relation_predicate("s", "S")),
                right: Box::new(inner.clone()),
                code_region: None,
            }),
            code_region: None,
        });
        let not_exists_not = expr(not(Formula::QuantifiedExpression {
            quantifier: Quantifier::Exists,
            variable: "s".to_string(),
            formula: Box::new(and(relation_predicate("s", "S"), not(inner))),
            code_region: None,
        }));

        prop_assert_eq!(result_a_values(&for_all), result_a_values(&not_exists_not));
    }

    /// P5: implication rewrite, `p -> q == not p or q`.
    #[test]
    fn implication_rewrite(
        left_tag in 0u8..4, left_threshold in 1i64..10,
        right_tag in 0u8..4, right_threshold in 1i64..10,
    ) {
        let p = compare("t", "a", compare_op(left_tag), left_threshold as f64);
        let q = compare("t", "a", compare_op(right_tag), right_threshold as f64);

        let implication = expr(Formula::LogicalExpression {
            operator: LogicalOp::Implies,
            left: Box::new(p.clone()),
            right: Box::new(q.clone()),
            code_region: None,
        });
        let rewritten = expr(or(not(p), q));

        prop_assert_eq!(result_a_values(&implication), result_a_values(&rewritten));
    }
}
