//! Value-expression lowering (C2), shared by the TRC, SQL, and RA-AST
//! translators.
//!
//! Maps a source-notation scalar expression into the canonical RA
//! value-expression tree: column references, typed constants, and
//! operator/function applications over either.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::catalog::DataType;

/// Maximum recursion depth for `sqlparser` expression lowering, matching
/// the defensive depth guard `flowscope-core`'s expression analyzer uses
/// against deeply nested or maliciously crafted input.
const MAX_RECURSION_DEPTH: usize = 100;

/// A literal scalar value carried by a [`ValueExpr::Constant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(String),
}

/// The canonical value-expression tree (C2's output shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueExpr {
    /// `ColumnValue(name, relAlias?)`. `data_type` is `None` exactly when
    /// the parser could not tag the column's type — spec.md's "`null`
    /// type ... only valid for `ColumnValue`".
    Column {
        name: String,
        relation_alias: Option<String>,
    },
    /// `Constant(type, literal)`.
    Constant { data_type: DataType, value: Literal },
    /// `Operator(type, name, args[])`.
    Operator {
        result_type: DataType,
        name: String,
        args: Vec<ValueExpr>,
    },
}

impl ValueExpr {
    pub fn column(name: impl Into<String>, relation_alias: Option<String>) -> Self {
        Self::Column {
            name: name.into(),
            relation_alias,
        }
    }

    pub fn boolean_op(name: impl Into<String>, args: Vec<ValueExpr>) -> Self {
        Self::Operator {
            result_type: DataType::Boolean,
            name: name.into(),
            args,
        }
    }

    /// A display name for a column, used only to label a `Projection`'s
    /// output schema; operators/constants have no column name of their
    /// own so they fall back to a synthesized label.
    pub fn display_name(&self) -> String {
        match self {
            ValueExpr::Column { name, .. } => name.clone(),
            ValueExpr::Constant { .. } => "?column?".to_string(),
            ValueExpr::Operator { name, .. } => name.clone(),
        }
    }

    pub fn result_type(&self) -> DataType {
        match self {
            ValueExpr::Column { .. } => DataType::Null,
            ValueExpr::Constant { data_type, .. } => *data_type,
            ValueExpr::Operator { result_type, .. } => *result_type,
        }
    }
}

/// Lowers a `sqlparser` scalar expression into a [`ValueExpr`], used by
/// both the SQL translator (C7a) and, indirectly, by TRC's
/// `convertPredicate` (C5 §4.1.5) for the predicate operand it already has
/// in hand as an `AttrRef`/literal rather than a full `sqlparser::Expr`.
pub fn lower_sql_expr(expr: &sqlparser::ast::Expr) -> Result<ValueExpr, String> {
    lower_sql_expr_depth(expr, 0)
}

fn lower_sql_expr_depth(expr: &sqlparser::ast::Expr, depth: usize) -> Result<ValueExpr, String> {
    use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value};

    if depth > MAX_RECURSION_DEPTH {
        #[cfg(feature = "tracing")]
        debug!(depth, "max recursion depth exceeded while lowering value expression");
        return Err("expression nested too deeply".to_string());
    }

    match expr {
        Expr::Identifier(ident) => Ok(ValueExpr::column(ident.value.clone(), None)),
        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [table, column] => Ok(ValueExpr::column(
                column.value.clone(),
                Some(table.value.clone()),
            )),
            _ => Err(format!(
                "unsupported compound identifier with {} parts",
                parts.len()
            )),
        },
        Expr::Value(Value::Number(n, _)) => Ok(ValueExpr::Constant {
            data_type: DataType::Number,
            value: Literal::Number(n.parse().map_err(|_| format!("invalid number {n}"))?),
        }),
        Expr::Value(Value::SingleQuotedString(s)) | Expr::Value(Value::DoubleQuotedString(s)) => {
            Ok(ValueExpr::Constant {
                data_type: DataType::String,
                value: Literal::String(s.clone()),
            })
        }
        Expr::Value(Value::Boolean(b)) => Ok(ValueExpr::Constant {
            data_type: DataType::Boolean,
            value: Literal::Boolean(*b),
        }),
        Expr::Value(Value::Null) => Ok(ValueExpr::Constant {
            data_type: DataType::Null,
            value: Literal::String("null".to_string()),
        }),
        Expr::TypedString { data_type, value } if data_type.to_string().to_lowercase() == "date" => {
            Ok(ValueExpr::Constant {
                data_type: DataType::Date,
                value: Literal::Date(value.clone()),
            })
        }
        Expr::BinaryOp { left, op, right } => {
            let name = binary_op_name(op)?;
            let result_type = if matches!(
                op,
                BinaryOperator::Eq
                    | BinaryOperator::NotEq
                    | BinaryOperator::Lt
                    | BinaryOperator::LtEq
                    | BinaryOperator::Gt
                    | BinaryOperator::GtEq
                    | BinaryOperator::And
                    | BinaryOperator::Or
            ) {
                DataType::Boolean
            } else {
                DataType::Number
            };
            Ok(ValueExpr::Operator {
                result_type,
                name,
                args: vec![
                    lower_sql_expr_depth(left, depth + 1)?,
                    lower_sql_expr_depth(right, depth + 1)?,
                ],
            })
        }
        Expr::UnaryOp { op, expr } => {
            let name = match op {
                UnaryOperator::Not => "not",
                UnaryOperator::Minus => "neg",
                UnaryOperator::Plus => "pos",
                _ => return Err(format!("unsupported unary operator {op:?}")),
            };
            let result_type = if matches!(op, UnaryOperator::Not) {
                DataType::Boolean
            } else {
                DataType::Number
            };
            Ok(ValueExpr::Operator {
                result_type,
                name: name.to_string(),
                args: vec![lower_sql_expr_depth(expr, depth + 1)?],
            })
        }
        Expr::Nested(inner) => lower_sql_expr_depth(inner, depth + 1),
        Expr::Function(func) => {
            let name = func.name.to_string().to_lowercase();
            let args = match &func.args {
                sqlparser::ast::FunctionArguments::List(list) => list
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        sqlparser::ast::FunctionArg::Unnamed(
                            sqlparser::ast::FunctionArgExpr::Expr(e),
                        ) => Some(lower_sql_expr_depth(e, depth + 1)),
                        _ => None,
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(ValueExpr::Operator {
                result_type: DataType::Number,
                name,
                args,
            })
        }
        other => Err(format!("unsupported value expression: {other}")),
    }
}

fn binary_op_name(op: &sqlparser::ast::BinaryOperator) -> Result<String, String> {
    use sqlparser::ast::BinaryOperator::*;
    let s = match op {
        Eq => "=",
        NotEq => "!=",
        Lt => "<",
        LtEq => "<=",
        Gt => ">",
        GtEq => ">=",
        And => "and",
        Or => "or",
        Plus => "+",
        Minus => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
        other => return Err(format!("unsupported binary operator {other:?}")),
    };
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    fn parse_expr(sql: &str) -> sqlparser::ast::Expr {
        let full = format!("SELECT {sql}");
        let stmts = Parser::parse_sql(&GenericDialect {}, &full).unwrap();
        match &stmts[0] {
            sqlparser::ast::Statement::Query(q) => match q.body.as_ref() {
                sqlparser::ast::SetExpr::Select(select) => match &select.projection[0] {
                    sqlparser::ast::SelectItem::UnnamedExpr(e) => e.clone(),
                    _ => panic!("expected unnamed expr"),
                },
                _ => panic!("expected select"),
            },
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn lowers_qualified_column() {
        let expr = parse_expr("t.a");
        let lowered = lower_sql_expr(&expr).unwrap();
        assert_eq!(
            lowered,
            ValueExpr::column("a", Some("t".to_string()))
        );
    }

    #[test]
    fn lowers_comparison_to_boolean_operator() {
        let expr = parse_expr("t.a > 3");
        let lowered = lower_sql_expr(&expr).unwrap();
        match lowered {
            ValueExpr::Operator {
                result_type, name, ..
            } => {
                assert_eq!(result_type, DataType::Boolean);
                assert_eq!(name, ">");
            }
            _ => panic!("expected operator"),
        }
    }

    #[test]
    fn lowers_string_constant() {
        let expr = parse_expr("'hello'");
        let lowered = lower_sql_expr(&expr).unwrap();
        assert_eq!(
            lowered,
            ValueExpr::Constant {
                data_type: DataType::String,
                value: Literal::String("hello".to_string())
            }
        );
    }
}
