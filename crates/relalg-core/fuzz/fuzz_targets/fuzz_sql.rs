//! Fuzz target for the SQL translator.
//!
//! This tests that `translate_sql()` doesn't panic on arbitrary inputs,
//! valid or not - it should always return a `Result`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relalg_core::catalog::{Column, DataType, InMemoryCatalog, Relation};
use relalg_core::options::TranslateOptions;
use relalg_core::{translate_sql, SqlDialect};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
}

impl FuzzInput {
    fn dialect(&self) -> SqlDialect {
        match self.dialect_idx % 5 {
            0 => SqlDialect::Generic,
            1 => SqlDialect::Postgres,
            2 => SqlDialect::Snowflake,
            3 => SqlDialect::Bigquery,
            _ => SqlDialect::Duckdb,
        }
    }
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_relation(Relation::new(
            "users",
            vec![Column::new("id", DataType::Number), Column::new("name", DataType::String)],
        ))
        .with_relation(Relation::new(
            "orders",
            vec![
                Column::new("id", DataType::Number),
                Column::new("user_id", DataType::Number),
                Column::new("total", DataType::Number),
            ],
        ))
}

fuzz_target!(|input: FuzzInput| {
    let dialect = input.dialect();
    let catalog = catalog();
    let opts = TranslateOptions::default();
    let _result = translate_sql(&input.sql, dialect, &catalog, &opts);
});
