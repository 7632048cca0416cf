//! The reference environment (C4): a pre-pass over the TRC AST building
//! the finite map `tupleVar -> relationName` (spec.md §4.1.2).

use std::collections::HashMap;

use crate::error::TranslateError;
use crate::ra::CodeRegion;

use super::ast::Formula;

/// `E`: write-once per variable. Built once per `translate_trc` call and
/// never shared across calls (spec.md §5).
#[derive(Debug, Clone, Default)]
pub struct ReferenceEnvironment {
    bindings: HashMap<String, String>,
}

impl ReferenceEnvironment {
    pub fn build(formula: &Formula) -> Result<Self, TranslateError> {
        let mut env = Self::default();
        env.walk(formula)?;
        Ok(env)
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }

    pub fn require(
        &self,
        variable: &str,
        code_region: Option<CodeRegion>,
    ) -> Result<&str, TranslateError> {
        self.get(variable)
            .ok_or_else(|| TranslateError::UnboundVariable {
                variable: variable.to_string(),
                code_region,
            })
    }

    fn bind(&mut self, variable: &str, relation: &str) -> Result<(), TranslateError> {
        match self.bindings.get(variable) {
            // Repeated binding of the same pair is idempotent.
            Some(existing) if existing == relation => Ok(()),
            Some(existing) => Err(TranslateError::UnsupportedNode {
                detail: format!(
                    "tuple variable `{variable}` is bound to both `{existing}` and `{relation}`"
                ),
                code_region: None,
            }),
            None => {
                self.bindings.insert(variable.to_string(), relation.to_string());
                Ok(())
            }
        }
    }

    fn walk(&mut self, formula: &Formula) -> Result<(), TranslateError> {
        match formula {
            Formula::RelationPredicate {
                variable, relation, ..
            } => self.bind(variable, relation),
            Formula::Predicate { .. } => Ok(()),
            Formula::Negation { formula, .. } => self.walk(formula),
            Formula::QuantifiedExpression { formula, .. } => self.walk(formula),
            Formula::LogicalExpression { left, right, .. } => {
                self.walk(left)?;
                self.walk(right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trc::ast::{AttrRef, CompareOp, Quantifier, RightOperand};
    use crate::catalog::DataType;
    use crate::value_expr::Literal;

    #[test]
    fn binds_from_relation_predicate() {
        let formula = Formula::RelationPredicate {
            variable: "t".to_string(),
            relation: "R".to_string(),
            code_region: None,
        };
        let env = ReferenceEnvironment::build(&formula).unwrap();
        assert_eq!(env.get("t"), Some("R"));
    }

    #[test]
    fn repeated_identical_binding_is_idempotent() {
        let formula = Formula::LogicalExpression {
            operator: crate::trc::ast::LogicalOp::And,
            left: Box::new(Formula::RelationPredicate {
                variable: "t".to_string(),
                relation: "R".to_string(),
                code_region: None,
            }),
            right: Box::new(Formula::RelationPredicate {
                variable: "t".to_string(),
                relation: "R".to_string(),
                code_region: None,
            }),
            code_region: None,
        };
        assert!(ReferenceEnvironment::build(&formula).is_ok());
    }

    #[test]
    fn conflicting_binding_is_an_error() {
        let formula = Formula::LogicalExpression {
            operator: crate::trc::ast::LogicalOp::And,
            left: Box::new(Formula::RelationPredicate {
                variable: "t".to_string(),
                relation: "R".to_string(),
                code_region: None,
            }),
            right: Box::new(Formula::RelationPredicate {
                variable: "t".to_string(),
                relation: "S".to_string(),
                code_region: None,
            }),
            code_region: None,
        };
        assert!(ReferenceEnvironment::build(&formula).is_err());
    }

    #[test]
    fn binds_through_quantifier() {
        let inner = Formula::Predicate {
            left: AttrRef {
                variable: "s".to_string(),
                attribute: "d".to_string(),
            },
            operator: CompareOp::Lt,
            right: RightOperand::Literal {
                data_type: DataType::Number,
                value: Literal::Number(200.0),
            },
            code_region: None,
        };
        let formula = Formula::QuantifiedExpression {
            quantifier: Quantifier::Exists,
            variable: "s".to_string(),
            formula: Box::new(Formula::LogicalExpression {
                operator: crate::trc::ast::LogicalOp::And,
                left: Box::new(Formula::RelationPredicate {
                    variable: "s".to_string(),
                    relation: "S".to_string(),
                    code_region: None,
                }),
                right: Box::new(inner),
                code_region: None,
            }),
            code_region: None,
        };
        let env = ReferenceEnvironment::build(&formula).unwrap();
        assert_eq!(env.get("s"), Some("S"));
    }
}
