//! SQL text to `sqlparser` AST, the front door for the SQL translator.

use crate::dialect::SqlDialect;
use crate::error::ParseError;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Parse SQL using the specified dialect.
pub fn parse_sql_with_dialect(
    sql: &str,
    dialect: SqlDialect,
) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    match Parser::parse_sql(sqlparser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(primary_err) => {
            // Parity fallback: Generic dialect frequently fails on Postgres-specific
            // operators (`?`, `->>`, `::`) commonly used in warehouse SQL.
            if matches!(dialect, SqlDialect::Generic) && looks_like_postgres_syntax(sql) {
                let postgres = PostgreSqlDialect {};
                if let Ok(statements) = Parser::parse_sql(&postgres, sql) {
                    return Ok(statements);
                }
            }
            Err(ParseError::from(primary_err).with_dialect(dialect))
        }
    }
}

fn looks_like_postgres_syntax(sql: &str) -> bool {
    sql.contains("::")
        || sql.contains("->")
        || sql.contains("?|")
        || sql.contains("?&")
        || sql.contains(" ? ")
        || sql.contains(" ?\n")
        || sql.contains("? '")
        || sql.contains("?\t")
}

/// Parse SQL using the generic dialect.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, ParseError> {
    parse_sql_with_dialect(sql, SqlDialect::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_select() {
        let result = parse_sql("SELECT * FROM users");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn rejects_invalid_sql() {
        assert!(parse_sql("SELECT * FROM").is_err());
    }

    #[test]
    fn parses_with_postgres_dialect() {
        let sql = "SELECT * FROM users WHERE name ILIKE '%test%'";
        assert!(parse_sql_with_dialect(sql, SqlDialect::Postgres).is_ok());
    }

    #[test]
    fn parses_with_snowflake_dialect() {
        let sql = "SELECT * FROM db.schema.table";
        assert!(parse_sql_with_dialect(sql, SqlDialect::Snowflake).is_ok());
    }

    #[test]
    fn generic_falls_back_for_postgres_cast_operator() {
        let sql = "SELECT workspace_id::text FROM ledger.usage_line_item";
        assert!(parse_sql(sql).is_ok());
    }
}
