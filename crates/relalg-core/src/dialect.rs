//! SQL dialect selection, shared by the parser wrapper and the SQL
//! translator (C7a). Mirrors `flowscope-core`'s `Dialect` type and its
//! Postgres-operator fallback heuristic for the generic dialect.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Generic,
    Postgres,
    Snowflake,
    Bigquery,
    Duckdb,
}

impl SqlDialect {
    pub fn to_sqlparser_dialect(self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            BigQueryDialect, DuckDbDialect, GenericDialect, PostgreSqlDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
        }
    }
}
