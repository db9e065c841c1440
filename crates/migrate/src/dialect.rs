//! SQL dialect seam
//!
//! The migrator never interpolates raw identifiers or literals into SQL;
//! every substituted value passes through the dialect's quoting helpers.

use crate::error::MigrateResult;
use crate::operations::{ColumnDef, ColumnType, SchemaOperation};

/// Compiles declarative schema operations into provider SQL and quotes
/// identifiers/literals on behalf of the history repository.
pub trait SqlDialect: Send + Sync {
    /// Quote a table/column/index identifier
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Quote a string literal
    fn quote_literal(&self, value: &str) -> String;

    /// Compile one schema operation into a SQL statement
    fn compile(&self, operation: &SchemaOperation) -> MigrateResult<String>;
}

/// ANSI-flavored dialect: double-quoted identifiers, single-quoted literals,
/// embedded quotes doubled.
#[derive(Debug, Clone, Default)]
pub struct AnsiDialect;

impl AnsiDialect {
    pub fn new() -> Self {
        Self
    }

    fn column_sql(&self, column: &ColumnDef) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(&column.name),
            self.type_sql(&column.column_type)
        );
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }

    fn type_sql(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::BigSerial => "BIGSERIAL".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Varchar(Some(len)) => format!("VARCHAR({})", len),
            ColumnType::Varchar(None) | ColumnType::Text => "TEXT".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
        }
    }

    fn identifier_list(&self, identifiers: &[String]) -> String {
        identifiers
            .iter()
            .map(|identifier| self.quote_identifier(identifier))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl SqlDialect for AnsiDialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn compile(&self, operation: &SchemaOperation) -> MigrateResult<String> {
        let sql = match operation {
            SchemaOperation::CreateTable {
                name,
                columns,
                primary_key,
            } => {
                let mut parts: Vec<String> =
                    columns.iter().map(|column| self.column_sql(column)).collect();
                if !primary_key.is_empty() {
                    parts.push(format!("PRIMARY KEY ({})", self.identifier_list(primary_key)));
                }
                format!(
                    "CREATE TABLE {} (\n    {}\n);",
                    self.quote_identifier(name),
                    parts.join(",\n    ")
                )
            }
            SchemaOperation::DropTable { name } => {
                format!("DROP TABLE {};", self.quote_identifier(name))
            }
            SchemaOperation::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {};",
                self.quote_identifier(table),
                self.column_sql(column)
            ),
            SchemaOperation::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {};",
                self.quote_identifier(table),
                self.quote_identifier(column)
            ),
            SchemaOperation::CreateIndex {
                name,
                table,
                columns,
                unique,
            } => format!(
                "CREATE {}INDEX {} ON {} ({});",
                if *unique { "UNIQUE " } else { "" },
                self.quote_identifier(name),
                self.quote_identifier(table),
                self.identifier_list(columns)
            ),
            SchemaOperation::DropIndex { name } => {
                format!("DROP INDEX {};", self.quote_identifier(name))
            }
            SchemaOperation::RawSql { sql } => sql.clone(),
        };
        Ok(sql)
    }
}
