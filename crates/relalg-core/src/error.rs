//! Error types for translation and SQL/TRC parsing.
//!
//! # Error handling strategy
//!
//! This crate uses two complementary patterns, mirroring the split
//! `flowscope-core` draws between fatal and non-fatal diagnostics:
//!
//! - [`TranslateError`]: fatal, terminal failures of a `translate_*` call
//!   (spec.md §7). Returned as `Result<_, TranslateError>` and abort the
//!   current translation.
//! - [`crate::ra::Warning`]: non-fatal diagnostics accumulated during SQL
//!   translation (non-`DISTINCT` SELECT, oversized cross join, …) and
//!   returned alongside a successful tree, so translation can still
//!   succeed even when the host should be told something.
//!
//! [`ParseError`] additionally wraps `sqlparser` failures for the SQL
//! front end, preserving position information when the underlying parser
//! error message carries one.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::dialect::SqlDialect;
use crate::ra::CodeRegion;

/// Terminal, typed translation failure (spec.md §7).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// `R(v)` or the catalog lookup for `E[v]` found nothing.
    #[error("unknown relation `{name}`")]
    UnknownRelation {
        name: String,
        code_region: Option<CodeRegion>,
    },

    /// A `Predicate` (or any other node) referenced a tuple variable `v`
    /// with no binding `R(v)` recorded in the reference environment.
    #[error("unbound tuple variable `{variable}`")]
    UnboundVariable {
        variable: String,
        code_region: Option<CodeRegion>,
    },

    /// A correlated quantifier or predicate was reached with no `base`;
    /// indicates a malformed AST (the outermost `TRC_Expr` is missing, or
    /// a quantifier was entered before the outer projection set one up).
    #[error("no base relation in scope")]
    NullBase { code_region: Option<CodeRegion> },

    /// An AST node shape outside the supported grammar.
    #[error("unsupported node: {detail}")]
    UnsupportedNode {
        detail: String,
        code_region: Option<CodeRegion>,
    },

    /// Negation was applied to a bare relation predicate. This should be
    /// unreachable after the logical-expression normalisation rules in
    /// §4.1.4 run; if it is raised, the pre-pass or a normalisation rule
    /// has a bug.
    #[error("negation applied directly to a relation predicate")]
    NegatedRelationPredicate { code_region: Option<CodeRegion> },
}

impl TranslateError {
    pub fn code_region(&self) -> Option<CodeRegion> {
        match self {
            Self::UnknownRelation { code_region, .. }
            | Self::UnboundVariable { code_region, .. }
            | Self::NullBase { code_region }
            | Self::UnsupportedNode { code_region, .. }
            | Self::NegatedRelationPredicate { code_region } => *code_region,
        }
    }
}

impl From<ParseError> for TranslateError {
    fn from(err: ParseError) -> Self {
        TranslateError::UnsupportedNode {
            detail: err.to_string(),
            code_region: None,
        }
    }
}

/// Error encountered while parsing SQL text into a `sqlparser` AST.
///
/// Preserves structured information from the underlying parser, including
/// position information when available.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub position: Option<Position>,
    pub dialect: Option<SqlDialect>,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    #[default]
    SyntaxError,
    MissingClause,
    UnexpectedEof,
    UnsupportedFeature,
    LexerError,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    pub fn with_position(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parses position from sqlparser's "... at Line: X, Column: Y" format.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("valid regex literal")
        });

        re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        })
    }

    fn infer_kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("unexpected end") || lower.contains("eof") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("expected") {
            ParseErrorKind::MissingClause
        } else if lower.contains("not supported") || lower.contains("unsupported") {
            ParseErrorKind::UnsupportedFeature
        } else if lower.contains("lexer") || lower.contains("token") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;
        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }
        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);
        let kind = Self::infer_kind_from_message(&message);
        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}
