//! Declarative schema operations
//!
//! Migrations declare their up/down steps as data rather than SQL text;
//! a [`crate::dialect::SqlDialect`] compiles them to provider-specific SQL
//! at execution time. This keeps SQL generation out of the planning phase
//! and lets large migration runs materialize one step at a time.

use serde::{Deserialize, Serialize};

/// Column data types understood by every dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Auto-incrementing 64-bit primary key
    BigSerial,
    BigInt,
    Integer,
    Boolean,
    /// Variable-length string with an optional maximum length
    Varchar(Option<u32>),
    Text,
    Uuid,
    Timestamp,
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Default expression, emitted verbatim by the dialect
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// A declarative schema change, compiled to SQL by a dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaOperation {
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
        primary_key: Vec<String>,
    },
    DropTable {
        name: String,
    },
    AddColumn {
        table: String,
        column: ColumnDef,
    },
    DropColumn {
        table: String,
        column: String,
    },
    CreateIndex {
        name: String,
        table: String,
        columns: Vec<String>,
        unique: bool,
    },
    DropIndex {
        name: String,
    },
    /// Escape hatch for provider-specific DDL; emitted verbatim
    RawSql {
        sql: String,
    },
}

impl SchemaOperation {
    /// Convenience constructor for a plain (non-unique) index with a
    /// derived name, matching the `idx_{table}_{columns}` convention.
    pub fn index(table: impl Into<String>, columns: &[&str]) -> Self {
        let table = table.into();
        SchemaOperation::CreateIndex {
            name: format!("idx_{}_{}", table, columns.join("_")),
            table,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }
}
