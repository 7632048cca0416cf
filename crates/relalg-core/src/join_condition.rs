//! Join-condition decoder (C6).
//!
//! Normalises the three concrete syntaxes a join condition can arrive in
//! — absent (`NATURAL JOIN` / `null`), a column list (`USING (cols)`), or
//! a boolean expression (`ON <expr>`) — into the single [`JoinCondition`]
//! shape the RA vocabulary understands. Shared by the SQL translator and
//! the RA-AST translator so `USING`/`NATURAL`/`ON` all funnel through one
//! code path.

use crate::ra::JoinCondition;
use crate::value_expr::{lower_sql_expr, ValueExpr};

/// The as-parsed shape of a join condition, before decoding.
pub enum JoinConditionSyntax<'a> {
    /// `NATURAL JOIN`, or no condition supplied at all.
    Null,
    /// `USING (col1, col2, ...)`.
    Columns(Vec<String>),
    /// `ON <boolean expr>`.
    Expression(&'a sqlparser::ast::Expr),
}

pub fn decode(syntax: JoinConditionSyntax<'_>) -> Result<JoinCondition, String> {
    match syntax {
        JoinConditionSyntax::Null => Ok(JoinCondition::Natural {
            restrict_to_columns: None,
        }),
        JoinConditionSyntax::Columns(cols) => Ok(JoinCondition::Natural {
            restrict_to_columns: Some(cols),
        }),
        JoinConditionSyntax::Expression(expr) => {
            let lowered = lower_sql_expr(expr)?;
            Ok(JoinCondition::Theta { expression: lowered })
        }
    }
}

/// Builds a theta `JoinCondition` directly from an already-lowered
/// boolean value-expression, used where the caller has no `sqlparser`
/// expression to lower (e.g. a native RA-AST theta join).
pub fn theta(expression: ValueExpr) -> JoinCondition {
    JoinCondition::Theta { expression }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_decodes_to_unrestricted_natural_join() {
        let decoded = decode(JoinConditionSyntax::Null).unwrap();
        assert!(matches!(
            decoded,
            JoinCondition::Natural {
                restrict_to_columns: None
            }
        ));
    }

    #[test]
    fn columns_decode_to_restricted_natural_join() {
        let decoded = decode(JoinConditionSyntax::Columns(vec!["id".to_string()])).unwrap();
        match decoded {
            JoinCondition::Natural {
                restrict_to_columns: Some(cols),
            } => assert_eq!(cols, vec!["id".to_string()]),
            _ => panic!("expected restricted natural join"),
        }
    }
}
