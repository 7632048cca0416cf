//! Tuple Relational Calculus AST schema (spec.md §6.2).
//!
//! This is the input the TRC translator (C5) consumes. It is a plain data
//! description — a parser elsewhere produces it; this crate never parses
//! TRC surface syntax itself (out of scope, spec.md §1).

use serde::{Deserialize, Serialize};

use crate::catalog::DataType;
use crate::ra::CodeRegion;
use crate::value_expr::Literal;

/// `{ t.p1,...,pk | Φ }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrcExpr {
    pub variable: String,
    pub projections: Vec<String>,
    pub formula: Box<Formula>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_region: Option<CodeRegion>,
}

/// `AttrRef { variable, attribute }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrRef {
    pub variable: String,
    pub attribute: String,
}

/// The comparison operator of a `Predicate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }
}

/// `Predicate.right`: either another attribute reference or a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RightOperand {
    Attr(AttrRef),
    Literal { data_type: DataType, value: Literal },
}

/// `Quantifier`: `exists` | `forAll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quantifier {
    Exists,
    ForAll,
}

/// `LogicalExpression.operator`: `and` | `or` | `implies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
    Implies,
}

/// The union of TRC formula node shapes (spec.md §6.2), everything below
/// the top-level `TrcExpr`'s projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Formula {
    RelationPredicate {
        variable: String,
        relation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_region: Option<CodeRegion>,
    },
    Predicate {
        left: AttrRef,
        operator: CompareOp,
        right: RightOperand,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_region: Option<CodeRegion>,
    },
    Negation {
        formula: Box<Formula>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_region: Option<CodeRegion>,
    },
    QuantifiedExpression {
        quantifier: Quantifier,
        variable: String,
        formula: Box<Formula>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_region: Option<CodeRegion>,
    },
    LogicalExpression {
        operator: LogicalOp,
        left: Box<Formula>,
        right: Box<Formula>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_region: Option<CodeRegion>,
    },
}

impl Formula {
    pub fn code_region(&self) -> Option<CodeRegion> {
        match self {
            Formula::RelationPredicate { code_region, .. }
            | Formula::Predicate { code_region, .. }
            | Formula::Negation { code_region, .. }
            | Formula::QuantifiedExpression { code_region, .. }
            | Formula::LogicalExpression { code_region, .. } => *code_region,
        }
    }

    /// True if `variable` occurs free anywhere in this (sub-)formula —
    /// used to distinguish a correlated from an uncorrelated existential
    /// (spec.md §4.1.4, "Case A"/"Case B").
    pub fn mentions_variable(&self, variable: &str) -> bool {
        match self {
            Formula::RelationPredicate { variable: v, .. } => v == variable,
            Formula::Predicate { left, right, .. } => {
                left.variable == variable
                    || matches!(right, RightOperand::Attr(a) if a.variable == variable)
            }
            Formula::Negation { formula, .. } => formula.mentions_variable(variable),
            Formula::QuantifiedExpression { formula, .. } => formula.mentions_variable(variable),
            Formula::LogicalExpression { left, right, .. } => {
                left.mentions_variable(variable) || right.mentions_variable(variable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(v: &str, a: &str) -> AttrRef {
        AttrRef {
            variable: v.to_string(),
            attribute: a.to_string(),
        }
    }

    #[test]
    fn mentions_variable_through_predicate() {
        let f = Formula::Predicate {
            left: attr("t", "a"),
            operator: CompareOp::Gt,
            right: RightOperand::Literal {
                data_type: DataType::Number,
                value: Literal::Number(3.0),
            },
            code_region: None,
        };
        assert!(f.mentions_variable("t"));
        assert!(!f.mentions_variable("s"));
    }

    #[test]
    fn mentions_variable_through_nested_quantifier() {
        let inner = Formula::Predicate {
            left: attr("s", "d"),
            operator: CompareOp::Lt,
            right: RightOperand::Attr(attr("t", "a")),
            code_region: None,
        };
        let quantified = Formula::QuantifiedExpression {
            quantifier: Quantifier::Exists,
            variable: "s".to_string(),
            formula: Box::new(inner),
            code_region: None,
        };
        assert!(quantified.mentions_variable("t"));
        assert!(quantified.mentions_variable("s"));
    }
}
