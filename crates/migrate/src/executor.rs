//! Command execution seam
//!
//! The migrator drives the database exclusively through
//! [`MigrationExecutor`]. A unit of work (one migration's schema SQL plus
//! its history-row mutation) is handed over as a single batch and must be
//! executed atomically: either every statement takes effect or none does.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::MigrateResult;
use crate::history::HistoryRow;

/// Executes generated SQL against a live connection
#[async_trait]
pub trait MigrationExecutor: Send + Sync {
    /// Check whether a table exists
    async fn table_exists(&self, table: &str) -> MigrateResult<bool>;

    /// Execute one atomic batch of statements
    async fn run_batch(&self, statements: &[String]) -> MigrateResult<()>;

    /// Run a history SELECT and map its rows
    async fn fetch_history(&self, query: &str) -> MigrateResult<Vec<HistoryRow>>;
}

/// Postgres executor over a sqlx connection pool. Each batch runs inside
/// its own transaction.
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MigrationExecutor for PostgresExecutor {
    async fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        let row = sqlx::query("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<bool, _>(0)?)
    }

    async fn run_batch(&self, statements: &[String]) -> MigrateResult<()> {
        let mut transaction = self.pool.begin().await?;
        for statement in statements {
            if statement.trim().is_empty() {
                continue;
            }
            tracing::debug!(statement, "executing migration statement");
            sqlx::query(statement).execute(&mut *transaction).await?;
        }
        transaction.commit().await?;
        Ok(())
    }

    async fn fetch_history(&self, query: &str) -> MigrateResult<Vec<HistoryRow>> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let mut history = Vec::with_capacity(rows.len());
        for row in rows {
            history.push(HistoryRow {
                plugin: row.try_get("Plugin")?,
                migration_id: row.try_get("MigrationId")?,
                product_version: row.try_get("ProductVersion")?,
            });
        }
        Ok(history)
    }
}
