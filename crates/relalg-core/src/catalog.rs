//! The read-only relation catalog (C3).
//!
//! A catalog maps a relation name to a [`Relation`] handle. Handles are
//! cheap to clone: [`Relation::copy`] is the defensive copy every RA leaf
//! takes before becoming a child, so a tree produced by a translator is
//! independently owned and safe to hand to another thread.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Scalar type tag carried by columns and value-expression literals.
///
/// `Null` denotes "unknown/unresolved" and is only ever attached to a
/// [`crate::value_expr::ValueExpr::Column`] whose type the parser could not
/// infer; it is never valid on a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    Null,
}

/// One column of a relation's schema, qualified by the relation it came
/// from (set once the column is embedded under a `RenameRelation`/join).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_alias: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            relation_alias: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.relation_alias {
            Some(alias) => format!("{alias}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// An ordered schema: the list of qualified columns a relation (or RA
/// node's output) carries.
pub type Schema = Vec<Column>;

/// A scalar value, used only for the inline test fixtures a [`Relation`]
/// may carry and for the internal reference evaluator (see [`crate::eval`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// A single row, positional against a [`Schema`].
pub type Tuple = Vec<Value>;

/// An immutable reference identifying a relation in the catalog.
///
/// Carries the schema plus, for test fixtures, inline tuples. `copy()`
/// returns a handle safe to embed as a leaf of an RA tree: it is a plain
/// `Clone`, so mutating the catalog's copy afterward cannot affect a tree
/// that already holds one (P7, catalog isolation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub schema: Schema,
    #[serde(default)]
    pub rows: Vec<Tuple>,
}

impl Relation {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Tuple>) -> Self {
        self.rows = rows;
        self
    }

    /// Defensive copy; every catalog lookup the translator performs goes
    /// through this so the returned tree never aliases catalog state.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// Read-only mapping from relation name to a relation handle.
///
/// The translator only ever calls [`Catalog::lookup`]; the trait object
/// indirection is the crate's one seam of abstraction (an
/// in-memory/test-fixture catalog today, a DB-backed one tomorrow) without
/// the translator needing to know which.
pub trait Catalog {
    fn lookup(&self, name: &str) -> Option<Relation>;
}

/// The in-memory catalog implementation used by the CLI, tests, and the
/// SQL/RA-AST translators' fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    relations: HashMap<String, Relation>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, relation: Relation) -> &mut Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.insert(relation);
        self
    }
}

impl Catalog for InMemoryCatalog {
    fn lookup(&self, name: &str) -> Option<Relation> {
        // Defensive copy on the way out, per the catalog-isolation invariant.
        self.relations.get(name).map(Relation::copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relation {
        Relation::new(
            "R",
            vec![
                Column::new("a", DataType::Number),
                Column::new("b", DataType::String),
            ],
        )
        .with_rows(vec![vec![Value::Number(1.0), Value::String("a".into())]])
    }

    #[test]
    fn copy_is_independent_of_source() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(sample());

        let handle = catalog.lookup("R").unwrap();
        catalog.insert(sample().with_rows(vec![]));

        // The handle taken before the mutation keeps its original rows.
        assert_eq!(handle.rows.len(), 1);
    }

    #[test]
    fn lookup_missing_relation_is_none() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.lookup("nope").is_none());
    }

    #[test]
    fn qualified_name_without_alias() {
        let col = Column::new("a", DataType::Number);
        assert_eq!(col.qualified_name(), "a");
    }

    #[test]
    fn qualified_name_with_alias() {
        let mut col = Column::new("a", DataType::Number);
        col.relation_alias = Some("R".to_string());
        assert_eq!(col.qualified_name(), "R.a");
    }
}
