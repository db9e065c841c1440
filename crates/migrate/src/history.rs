//! Applied-migration history
//!
//! All plugins share one history table; its layout is fixed for on-disk
//! compatibility and must not change. A row exists exactly while the
//! corresponding migration is applied: inserted with the migration's "up"
//! batch, deleted with its "down" batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dialect::SqlDialect;
use crate::error::MigrateResult;
use crate::executor::MigrationExecutor;
use crate::operations::{ColumnDef, ColumnType, SchemaOperation};

/// Name of the shared history table
pub const HISTORY_TABLE: &str = "__EntityPluginMigrationsHistory";

/// One applied-migration record. Composite key: (plugin, migration_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// Durable plugin identifier
    pub plugin: String,
    /// The migration's `SemanticVersion` string form, e.g. `"1.0.0-2"`
    pub migration_id: String,
    /// Version of the hosting product that applied the migration
    pub product_version: String,
}

/// Generates and runs the SQL around the shared history table. Script
/// generators are pure; `exists` and `applied_migrations` go through the
/// injected executor.
pub struct HistoryRepository {
    dialect: Arc<dyn SqlDialect>,
    executor: Arc<dyn MigrationExecutor>,
}

impl HistoryRepository {
    pub fn new(dialect: Arc<dyn SqlDialect>, executor: Arc<dyn MigrationExecutor>) -> Self {
        Self { dialect, executor }
    }

    /// Whether the history table exists yet
    pub async fn exists(&self) -> MigrateResult<bool> {
        self.executor.table_exists(HISTORY_TABLE).await
    }

    /// DDL creating the history table
    pub fn create_script(&self) -> MigrateResult<String> {
        self.dialect.compile(&SchemaOperation::CreateTable {
            name: HISTORY_TABLE.to_string(),
            columns: vec![
                ColumnDef::new("Plugin", ColumnType::Varchar(Some(150))).not_null(),
                ColumnDef::new("MigrationId", ColumnType::Varchar(Some(150))).not_null(),
                ColumnDef::new("ProductVersion", ColumnType::Varchar(Some(32))).not_null(),
            ],
            primary_key: vec!["Plugin".to_string(), "MigrationId".to_string()],
        })
    }

    /// SELECT for a plugin's applied rows.
    ///
    /// Rows come back ordered by the raw `MigrationId` string, which is
    /// not semantic-version order (`"2.0.0-1"` sorts after `"10.0.0-1"`
    /// lexicographically). Callers must re-sort by parsed version.
    pub fn applied_query(&self, plugin: &str) -> String {
        format!(
            "SELECT {plugin_col}, {id_col}, {product_col} FROM {table} WHERE {plugin_col} = {plugin} ORDER BY {id_col}",
            table = self.dialect.quote_identifier(HISTORY_TABLE),
            plugin_col = self.dialect.quote_identifier("Plugin"),
            id_col = self.dialect.quote_identifier("MigrationId"),
            product_col = self.dialect.quote_identifier("ProductVersion"),
            plugin = self.dialect.quote_literal(plugin),
        )
    }

    /// Fetch a plugin's applied rows (raw string order, see
    /// [`HistoryRepository::applied_query`])
    pub async fn applied_migrations(&self, plugin: &str) -> MigrateResult<Vec<HistoryRow>> {
        self.executor.fetch_history(&self.applied_query(plugin)).await
    }

    /// INSERT recording a migration as applied
    pub fn insert_script(&self, row: &HistoryRow) -> String {
        format!(
            "INSERT INTO {table} ({plugin_col}, {id_col}, {product_col}) VALUES ({plugin}, {id}, {product});",
            table = self.dialect.quote_identifier(HISTORY_TABLE),
            plugin_col = self.dialect.quote_identifier("Plugin"),
            id_col = self.dialect.quote_identifier("MigrationId"),
            product_col = self.dialect.quote_identifier("ProductVersion"),
            plugin = self.dialect.quote_literal(&row.plugin),
            id = self.dialect.quote_literal(&row.migration_id),
            product = self.dialect.quote_literal(&row.product_version),
        )
    }

    /// DELETE removing a reverted migration's row
    pub fn delete_script(&self, plugin: &str, migration_id: &str) -> String {
        format!(
            "DELETE FROM {table} WHERE {plugin_col} = {plugin} AND {id_col} = {id};",
            table = self.dialect.quote_identifier(HISTORY_TABLE),
            plugin_col = self.dialect.quote_identifier("Plugin"),
            id_col = self.dialect.quote_identifier("MigrationId"),
            plugin = self.dialect.quote_literal(plugin),
            id = self.dialect.quote_literal(migration_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::testing::MemoryExecutor;

    fn repository() -> HistoryRepository {
        HistoryRepository::new(Arc::new(AnsiDialect::new()), Arc::new(MemoryExecutor::new()))
    }

    #[test]
    fn test_create_script_layout() {
        let sql = repository().create_script().unwrap();
        assert!(sql.contains("CREATE TABLE \"__EntityPluginMigrationsHistory\""));
        assert!(sql.contains("\"Plugin\" VARCHAR(150) NOT NULL"));
        assert!(sql.contains("\"MigrationId\" VARCHAR(150) NOT NULL"));
        assert!(sql.contains("\"ProductVersion\" VARCHAR(32) NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"Plugin\", \"MigrationId\")"));
    }

    #[test]
    fn test_scripts_escape_values() {
        let repository = repository();
        let insert = repository.insert_script(&HistoryRow {
            plugin: "O'Brien".to_string(),
            migration_id: "1.0.0-1".to_string(),
            product_version: "0.2.0".to_string(),
        });
        assert!(insert.contains("'O''Brien'"));
        assert!(insert.contains("'1.0.0-1'"));

        let delete = repository.delete_script("O'Brien", "1.0.0-1");
        assert!(delete.contains("'O''Brien'"));
        assert!(delete.contains("\"MigrationId\" = '1.0.0-1'"));
    }

    #[test]
    fn test_applied_query_orders_by_raw_id() {
        let sql = repository().applied_query("PluginA");
        assert!(sql.contains("WHERE \"Plugin\" = 'PluginA'"));
        assert!(sql.ends_with("ORDER BY \"MigrationId\""));
    }

    #[tokio::test]
    async fn test_exists_and_applied_via_executor() {
        let executor = Arc::new(MemoryExecutor::new());
        let repository =
            HistoryRepository::new(Arc::new(AnsiDialect::new()), executor.clone());

        assert!(!repository.exists().await.unwrap());
        repository
            .executor
            .run_batch(&[repository.create_script().unwrap()])
            .await
            .unwrap();
        assert!(repository.exists().await.unwrap());

        let row = HistoryRow {
            plugin: "PluginA".to_string(),
            migration_id: "1.0.0-1".to_string(),
            product_version: "0.2.0".to_string(),
        };
        repository
            .executor
            .run_batch(&[repository.insert_script(&row)])
            .await
            .unwrap();
        assert_eq!(repository.applied_migrations("PluginA").await.unwrap(), vec![row]);
        assert!(repository.applied_migrations("PluginB").await.unwrap().is_empty());
    }
}
