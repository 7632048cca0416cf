//! CLI argument parsing using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relalg - lowers SQL, tuple relational calculus, and a native RA AST
/// into a canonical relational-algebra operator tree.
#[derive(Parser, Debug)]
#[command(name = "relalg")]
#[command(about = "Translate SQL / TRC / RA-AST into a relational-algebra tree", long_about = None)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print the produced tree as serialized JSON instead of an indented
    /// S-expression-like rendering.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-fatal warnings on stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a Tuple Relational Calculus expression (JSON AST file).
    Trc {
        /// Path to a JSON-encoded `TrcExpr` (reads stdin if omitted).
        file: Option<PathBuf>,

        /// Catalog JSON file the expression's relations are looked up in.
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,
    },
    /// Translate a SQL query.
    Sql {
        /// The SQL query text (reads stdin if omitted).
        query: Option<String>,

        /// Catalog JSON file the query's relations are looked up in.
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,

        /// SQL dialect.
        #[arg(short, long, default_value = "generic", value_enum)]
        dialect: DialectArg,
    },
    /// Translate a native RA AST (JSON file), resolving its leaves
    /// against a catalog.
    #[command(name = "ra-ast")]
    RaAst {
        /// Path to a JSON-encoded `RaAst` (reads stdin if omitted).
        file: Option<PathBuf>,

        /// Catalog JSON file the tree's relation leaves are looked up in.
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,
    },
}

/// SQL dialect options exposed on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Postgres,
    Snowflake,
    Bigquery,
    Duckdb,
}

impl From<DialectArg> for relalg_core::SqlDialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => relalg_core::SqlDialect::Generic,
            DialectArg::Postgres => relalg_core::SqlDialect::Postgres,
            DialectArg::Snowflake => relalg_core::SqlDialect::Snowflake,
            DialectArg::Bigquery => relalg_core::SqlDialect::Bigquery,
            DialectArg::Duckdb => relalg_core::SqlDialect::Duckdb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sql_subcommand() {
        let args = Args::parse_from(["relalg", "sql", "SELECT 1", "-c", "catalog.json"]);
        match args.command {
            Command::Sql { query, catalog, .. } => {
                assert_eq!(query.as_deref(), Some("SELECT 1"));
                assert_eq!(catalog, PathBuf::from("catalog.json"));
            }
            other => panic!("expected Sql subcommand, got {other:?}"),
        }
    }

    #[test]
    fn parses_trc_subcommand_with_file() {
        let args = Args::parse_from(["relalg", "trc", "expr.json", "-c", "catalog.json"]);
        match args.command {
            Command::Trc { file, catalog } => {
                assert_eq!(file, Some(PathBuf::from("expr.json")));
                assert_eq!(catalog, PathBuf::from("catalog.json"));
            }
            other => panic!("expected Trc subcommand, got {other:?}"),
        }
    }

    #[test]
    fn dialect_conversion() {
        let dialect: relalg_core::SqlDialect = DialectArg::Postgres.into();
        assert_eq!(dialect, relalg_core::SqlDialect::Postgres);
    }
}
