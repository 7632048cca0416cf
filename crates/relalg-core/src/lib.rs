//! Lowers SQL, Tuple Relational Calculus, and a native RA AST into a
//! single canonical relational-algebra operator tree, evaluable against
//! an in-memory catalog.
//!
//! Three entry points share one vocabulary: [`ra::RaKind`] is the tree
//! shape every translator emits, [`value_expr::ValueExpr`] is the scalar
//! expression language embedded in it, and [`error::TranslateError`] is
//! the one failure type all three can raise. [`translate_trc`] is the
//! load-bearing translator (negation propagation, quantifier elimination,
//! correlated/uncorrelated existential handling); [`translate_sql`] and
//! [`translate_ra_ast`] are thinner structural walks sharing its catalog,
//! join-condition decoder, and value-expression lowering.

pub mod catalog;
pub mod dialect;
pub mod error;
pub mod eval;
pub mod join_condition;
pub mod options;
pub mod parser;
pub mod ra;
pub mod ra_ast;
pub mod sql;
pub mod trc;
pub mod value_expr;

pub use catalog::{Catalog, Column, DataType, InMemoryCatalog, Relation, Schema, Tuple, Value};
pub use dialect::SqlDialect;
pub use error::{ParseError, ParseErrorKind, TranslateError};
pub use options::{TranslateOptions, DEFAULT_CROSS_JOIN_WARNING_THRESHOLD};
pub use ra::{CodeRegion, JoinCondition, RaKind, RaNode, SemiJoinSide, Warning};
pub use ra_ast::{translate_ra_ast, RaAst, RaAstKind};
pub use sql::translate_sql;
pub use trc::translate_trc;
pub use value_expr::{Literal, ValueExpr};
