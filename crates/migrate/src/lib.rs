//! # stratum-migrate
//!
//! Plugin-scoped, versioned schema migrations over a relational store.
//! Independently developed plugins register ordered migration sequences
//! with optional cross-plugin version dependencies; the [`Migrator`]
//! computes the linear execution order, diffs it against the shared
//! history table, and applies or reverts the minimal set of steps to
//! reach a target state. Each step is executed as one atomic batch
//! (schema SQL plus its history-row mutation), so re-running a migration
//! after a partial failure resumes exactly where it stopped.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stratum_migrate::{
//!     AnsiDialect, ColumnDef, ColumnType, EntityPlugin, MigrationTarget, Migrator,
//!     PluginRegistry, PostgresExecutor, SchemaOperation,
//! };
//!
//! # async fn run(pool: sqlx::PgPool) -> stratum_migrate::MigrateResult<()> {
//! let blog = EntityPlugin::builder("Blog")
//!     .migration("1.0.0", 1, |m| {
//!         m.up(SchemaOperation::CreateTable {
//!             name: "posts".to_string(),
//!             columns: vec![ColumnDef::new("id", ColumnType::BigSerial).not_null()],
//!             primary_key: vec!["id".to_string()],
//!         })
//!         .down(SchemaOperation::DropTable { name: "posts".to_string() });
//!     })
//!     .build()?;
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(blog)?;
//!
//! let migrator = Migrator::new(
//!     Arc::new(AnsiDialect::new()),
//!     Arc::new(PostgresExecutor::new(pool)),
//! );
//! migrator.migrate_all(&registry).await?;
//! # Ok(())
//! # }
//! ```

pub mod dialect;
pub mod error;
pub mod executor;
pub mod history;
pub mod migrator;
pub mod operations;
pub mod plugin;
pub mod testing;
pub mod version;

pub use dialect::{AnsiDialect, SqlDialect};
pub use error::{BoxError, MigrateError, MigrateResult};
pub use executor::{MigrationExecutor, PostgresExecutor};
pub use history::{HistoryRepository, HistoryRow, HISTORY_TABLE};
pub use migrator::{
    InstallReport, MigrationDirection, MigrationReport, MigrationTarget, Migrator, PlannedStep,
};
pub use operations::{ColumnDef, ColumnType, SchemaOperation};
pub use plugin::{
    EntityPlugin, EntityPluginBuilder, MigrationBuilder, MigrationDependency,
    MigrationDescriptor, PluginRegistry,
};
pub use version::SemanticVersion;
