//! Migration resolver and applier
//!
//! Given a plugin (or a whole registry) and a target, the [`Migrator`]
//! diffs declared migrations against the history table, produces an
//! ordered sequence of work units, and executes them one at a time. Each
//! unit's schema SQL and its history-row mutation go to the executor as a
//! single atomic batch, so a failed step is never recorded as applied or
//! reverted. SQL is materialized per unit at execution time, not while
//! planning.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dialect::SqlDialect;
use crate::error::{MigrateError, MigrateResult};
use crate::executor::MigrationExecutor;
use crate::history::{HistoryRepository, HistoryRow};
use crate::plugin::{EntityPlugin, MigrationDescriptor, PluginRegistry};
use crate::version::SemanticVersion;

/// Desired end state for a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationTarget {
    /// Apply everything not yet applied
    Latest,
    /// Revert everything, leaving the plugin fully uninstalled
    Initial,
    /// Bring the plugin to exactly this version
    Version(SemanticVersion),
}

impl MigrationTarget {
    /// String form accepted by [`MigrationTarget::parse`] for
    /// [`MigrationTarget::Initial`]
    pub const INITIAL: &'static str = "initial";

    /// `None` means latest, `"initial"` means fully uninstalled, anything
    /// else must parse as a version.
    pub fn parse(text: Option<&str>) -> MigrateResult<Self> {
        match text {
            None => Ok(MigrationTarget::Latest),
            Some(Self::INITIAL) => Ok(MigrationTarget::Initial),
            Some(text) => Ok(MigrationTarget::Version(SemanticVersion::parse(text)?)),
        }
    }
}

/// Direction of one migration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationDirection {
    Up,
    Down,
}

/// One planned step, for dry-run inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub plugin: String,
    pub migration_id: String,
    pub direction: MigrationDirection,
}

/// Result of migrating one plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub plugin: String,
    /// Migration ids applied, in execution order
    pub applied: Vec<String>,
    /// Migration ids reverted, in execution order
    pub reverted: Vec<String>,
    pub execution_time_ms: u128,
}

impl MigrationReport {
    /// True when the run executed no commands at all
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.reverted.is_empty()
    }
}

/// Result of a multi-plugin install
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    /// Per-plugin reports in the order plugins were migrated
    pub plugins: Vec<MigrationReport>,
    pub execution_time_ms: u128,
}

/// A single migration step awaiting materialization. `schema_reference`
/// is the state a down step reverts to: the next revert in the queue, or
/// the migration that remains applied at the target.
struct WorkUnit<'a> {
    migration: &'a MigrationDescriptor,
    direction: MigrationDirection,
    schema_reference: Option<&'a MigrationDescriptor>,
}

/// Applied versions observed this run, per plugin: history state merged
/// with steps applied earlier in the same multi-plugin install.
#[derive(Default)]
struct RunContext {
    applied: HashMap<String, Vec<SemanticVersion>>,
}

/// Resolves and applies plugin migrations
pub struct Migrator {
    dialect: Arc<dyn SqlDialect>,
    executor: Arc<dyn MigrationExecutor>,
    history: HistoryRepository,
    product_version: String,
}

impl Migrator {
    pub fn new(dialect: Arc<dyn SqlDialect>, executor: Arc<dyn MigrationExecutor>) -> Self {
        let history = HistoryRepository::new(dialect.clone(), executor.clone());
        Self {
            dialect,
            executor,
            history,
            product_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the product version stamped into history rows
    pub fn with_product_version(mut self, product_version: impl Into<String>) -> Self {
        self.product_version = product_version.into();
        self
    }

    pub fn history(&self) -> &HistoryRepository {
        &self.history
    }

    /// Bring one plugin to the given target
    pub async fn migrate_plugin(
        &self,
        plugin: &EntityPlugin,
        target: MigrationTarget,
    ) -> MigrateResult<MigrationReport> {
        let mut context = RunContext::default();
        self.migrate_with_context(plugin, &target, &mut context).await
    }

    /// Bring every plugin in the registry to its latest version, migrating
    /// dependencies first. The plugin dependency graph is validated before
    /// any SQL executes; a cycle aborts the whole call.
    pub async fn migrate_all(&self, registry: &PluginRegistry) -> MigrateResult<InstallReport> {
        let start = std::time::Instant::now();
        let order = topological_order(registry)?;

        let mut context = RunContext::default();
        let mut reports = Vec::with_capacity(order.len());
        for plugin in order {
            let report = self
                .migrate_with_context(plugin, &MigrationTarget::Latest, &mut context)
                .await?;
            reports.push(report);
        }

        Ok(InstallReport {
            plugins: reports,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// Compute the steps a migration to `target` would execute, without
    /// touching the database beyond reading history.
    pub async fn plan_plugin(
        &self,
        plugin: &EntityPlugin,
        target: &MigrationTarget,
    ) -> MigrateResult<Vec<PlannedStep>> {
        let applied = self.applied_history(plugin.identifier()).await?;
        let units = build_units(plugin, target, &applied)?;
        Ok(units
            .iter()
            .map(|unit| PlannedStep {
                plugin: unit.migration.plugin.clone(),
                migration_id: unit.migration.migration_id(),
                direction: unit.direction,
            })
            .collect())
    }

    async fn migrate_with_context(
        &self,
        plugin: &EntityPlugin,
        target: &MigrationTarget,
        context: &mut RunContext,
    ) -> MigrateResult<MigrationReport> {
        let start = std::time::Instant::now();
        self.ensure_history_table().await?;

        let applied = self.applied_history(plugin.identifier()).await?;
        let units = build_units(plugin, target, &applied)?;

        // seed the run context with history, so later plugins' dependency
        // checks see versions applied in earlier runs too
        let seen = context
            .applied
            .entry(plugin.identifier().to_string())
            .or_default();
        for version in &applied {
            if !seen.contains(version) {
                seen.push(version.clone());
            }
        }

        let mut report = MigrationReport {
            plugin: plugin.identifier().to_string(),
            applied: Vec::new(),
            reverted: Vec::new(),
            execution_time_ms: 0,
        };

        if units.is_empty() {
            tracing::debug!(plugin = plugin.identifier(), "plugin already at target, nothing to do");
            report.execution_time_ms = start.elapsed().as_millis();
            return Ok(report);
        }

        for unit in &units {
            if unit.direction == MigrationDirection::Up {
                self.check_dependencies(unit.migration, context).await?;
            }
            self.execute_unit(unit).await?;
            match unit.direction {
                MigrationDirection::Up => {
                    context
                        .applied
                        .entry(unit.migration.plugin.clone())
                        .or_default()
                        .push(unit.migration.version.clone());
                    report.applied.push(unit.migration.migration_id());
                }
                MigrationDirection::Down => {
                    if let Some(versions) = context.applied.get_mut(&unit.migration.plugin) {
                        versions.retain(|version| version != &unit.migration.version);
                    }
                    report.reverted.push(unit.migration.migration_id());
                }
            }
        }

        report.execution_time_ms = start.elapsed().as_millis();
        tracing::info!(
            plugin = plugin.identifier(),
            applied = report.applied.len(),
            reverted = report.reverted.len(),
            "plugin migration complete"
        );
        Ok(report)
    }

    /// Bootstrap the history table. Attempted on every migrate call.
    async fn ensure_history_table(&self) -> MigrateResult<()> {
        if !self.history.exists().await? {
            tracing::info!("creating migration history table");
            self.executor
                .run_batch(&[self.history.create_script()?])
                .await?;
        }
        Ok(())
    }

    /// Applied rows for a plugin, re-sorted by parsed semantic version.
    /// The repository's ORDER BY is raw string order and cannot be trusted
    /// for ids like "2.0.0-1" vs "10.0.0-1".
    async fn applied_history(&self, plugin: &str) -> MigrateResult<Vec<SemanticVersion>> {
        if !self.history.exists().await? {
            return Ok(Vec::new());
        }
        let rows = self.history.applied_migrations(plugin).await?;
        let mut versions = rows
            .iter()
            .map(|row| SemanticVersion::parse(&row.migration_id))
            .collect::<MigrateResult<Vec<_>>>()?;
        versions.sort();
        Ok(versions)
    }

    /// Verify every declared dependency of one migration: the dependency's
    /// plugin must already have a migration at or above the required
    /// version, either in history or applied earlier in this run.
    async fn check_dependencies(
        &self,
        migration: &MigrationDescriptor,
        context: &mut RunContext,
    ) -> MigrateResult<()> {
        for dependency in &migration.dependencies {
            if !context.applied.contains_key(&dependency.plugin) {
                let versions = self.applied_history(&dependency.plugin).await?;
                context.applied.insert(dependency.plugin.clone(), versions);
            }
            let satisfied = context.applied[&dependency.plugin]
                .iter()
                .any(|version| version >= &dependency.min_version);
            if !satisfied {
                return Err(MigrateError::UnmetDependency {
                    plugin: migration.plugin.clone(),
                    dependency: dependency.plugin.clone(),
                    required: dependency.min_version.clone(),
                });
            }
        }
        Ok(())
    }

    /// Materialize one unit's SQL and run it as a single atomic batch:
    /// the migration's schema operations followed by exactly one
    /// history-row mutation.
    async fn execute_unit(&self, unit: &WorkUnit<'_>) -> MigrateResult<()> {
        let migration = unit.migration;
        let operations = match unit.direction {
            MigrationDirection::Up => &migration.up,
            MigrationDirection::Down => &migration.down,
        };

        let mut statements = Vec::with_capacity(operations.len() + 1);
        for operation in operations {
            statements.push(self.dialect.compile(operation)?);
        }
        match unit.direction {
            MigrationDirection::Up => statements.push(self.history.insert_script(&HistoryRow {
                plugin: migration.plugin.clone(),
                migration_id: migration.migration_id(),
                product_version: self.product_version.clone(),
            })),
            MigrationDirection::Down => statements.push(
                self.history
                    .delete_script(&migration.plugin, &migration.migration_id()),
            ),
        }

        tracing::info!(
            plugin = migration.plugin.as_str(),
            migration = migration.migration_id().as_str(),
            direction = ?unit.direction,
            reverts_to = unit
                .schema_reference
                .map(|reference| reference.migration_id())
                .as_deref(),
            "executing migration step"
        );
        self.executor.run_batch(&statements).await
    }
}

/// Partition a plugin's migrations against history and resolve the target
/// into an ordered unit sequence: reverts first (descending), then applies
/// (ascending).
fn build_units<'a>(
    plugin: &'a EntityPlugin,
    target: &MigrationTarget,
    applied: &[SemanticVersion],
) -> MigrateResult<Vec<WorkUnit<'a>>> {
    let mut applied_descriptors: Vec<&MigrationDescriptor> = Vec::new();
    let mut unapplied: Vec<&MigrationDescriptor> = Vec::new();
    for migration in plugin.migrations() {
        if applied.contains(&migration.version) {
            applied_descriptors.push(migration);
        } else {
            unapplied.push(migration);
        }
    }
    // semantic order, never raw declaration or string order
    applied_descriptors.sort_by(|a, b| a.version.cmp(&b.version));
    unapplied.sort_by(|a, b| a.version.cmp(&b.version));

    let (to_apply, to_revert, actual_target) = match target {
        MigrationTarget::Latest => (unapplied, Vec::new(), None),
        MigrationTarget::Initial => {
            applied_descriptors.reverse();
            (Vec::new(), applied_descriptors, None)
        }
        // purely filter-based: the target need not name a declared
        // migration, it just splits the sequence
        MigrationTarget::Version(version) => {
            // highest applied migration that survives the move, if any
            let actual_target = applied_descriptors
                .iter()
                .rev()
                .find(|migration| &migration.version <= version)
                .copied();
            let to_apply: Vec<_> = unapplied
                .into_iter()
                .filter(|migration| &migration.version <= version)
                .collect();
            let mut to_revert: Vec<_> = applied_descriptors
                .into_iter()
                .filter(|migration| &migration.version > version)
                .collect();
            to_revert.reverse();
            (to_apply, to_revert, actual_target)
        }
    };

    let mut units = Vec::with_capacity(to_revert.len() + to_apply.len());
    for (i, migration) in to_revert.iter().enumerate() {
        units.push(WorkUnit {
            migration: *migration,
            direction: MigrationDirection::Down,
            schema_reference: to_revert.get(i + 1).copied().or(actual_target),
        });
    }
    for migration in to_apply {
        units.push(WorkUnit {
            migration,
            direction: MigrationDirection::Up,
            schema_reference: None,
        });
    }
    Ok(units)
}

/// Order plugins so that dependencies migrate first. Plugin-level edges:
/// P depends on Q when any migration of P declares a dependency on Q.
/// Registration order is preserved among unordered plugins. A cycle is a
/// configuration error, detected before any SQL executes.
fn topological_order(registry: &PluginRegistry) -> MigrateResult<Vec<&EntityPlugin>> {
    let mut dependencies: HashMap<&str, Vec<&str>> = HashMap::new();
    for plugin in registry.iter() {
        let entry = dependencies.entry(plugin.identifier()).or_default();
        for migration in plugin.migrations() {
            for dependency in &migration.dependencies {
                // plugins outside the registry are checked against history
                // at apply time instead
                if registry.get(&dependency.plugin).is_some()
                    && dependency.plugin != plugin.identifier()
                    && !entry.contains(&dependency.plugin.as_str())
                {
                    entry.push(dependency.plugin.as_str());
                }
            }
        }
    }

    let mut order: Vec<&EntityPlugin> = Vec::with_capacity(registry.len());
    let mut placed: Vec<&str> = Vec::with_capacity(registry.len());
    while order.len() < registry.len() {
        let mut progressed = false;
        for plugin in registry.iter() {
            if placed.contains(&plugin.identifier()) {
                continue;
            }
            let ready = dependencies[plugin.identifier()]
                .iter()
                .all(|dependency| placed.contains(dependency));
            if ready {
                placed.push(plugin.identifier());
                order.push(plugin);
                progressed = true;
            }
        }
        if !progressed {
            let stuck = registry
                .iter()
                .find(|plugin| !placed.contains(&plugin.identifier()))
                .map(|plugin| plugin.identifier().to_string())
                .unwrap_or_default();
            return Err(MigrateError::CyclicDependency(stuck));
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::operations::{ColumnDef, ColumnType, SchemaOperation};
    use crate::testing::MemoryExecutor;

    fn table(name: &str) -> SchemaOperation {
        SchemaOperation::CreateTable {
            name: name.to_string(),
            columns: vec![ColumnDef::new("id", ColumnType::BigSerial).not_null()],
            primary_key: vec!["id".to_string()],
        }
    }

    fn drop_table(name: &str) -> SchemaOperation {
        SchemaOperation::DropTable {
            name: name.to_string(),
        }
    }

    fn plugin_c() -> EntityPlugin {
        EntityPlugin::builder("PluginC")
            .migration("1.0.0", 1, |m| {
                m.up(table("c_items")).down(drop_table("c_items"));
            })
            .migration("2.0.0", 1, |m| {
                m.up(SchemaOperation::AddColumn {
                    table: "c_items".to_string(),
                    column: ColumnDef::new("label", ColumnType::Text),
                })
                .down(SchemaOperation::DropColumn {
                    table: "c_items".to_string(),
                    column: "label".to_string(),
                });
            })
            .build()
            .unwrap()
    }

    fn migrator(executor: Arc<MemoryExecutor>) -> Migrator {
        Migrator::new(Arc::new(AnsiDialect::new()), executor).with_product_version("0.2.0")
    }

    #[tokio::test]
    async fn test_migrate_to_latest_applies_everything_in_order() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());

        let report = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["1.0.0-1", "2.0.0-1"]);
        assert!(report.reverted.is_empty());

        let ids: Vec<String> = executor
            .history_rows()
            .iter()
            .map(|row| row.migration_id.clone())
            .collect();
        assert_eq!(ids, vec!["1.0.0-1", "2.0.0-1"]);
        // history table bootstrap + one batch per migration
        assert_eq!(executor.batch_count(), 3);
    }

    #[tokio::test]
    async fn test_unit_bundles_schema_and_history_mutation() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await
            .unwrap();

        let batches = executor.batches();
        let first_unit = &batches[1];
        assert!(first_unit[0].starts_with("CREATE TABLE \"c_items\""));
        assert!(first_unit[1].starts_with("INSERT INTO \"__EntityPluginMigrationsHistory\""));
        assert!(first_unit[1].contains("'0.2.0'"));
    }

    #[tokio::test]
    async fn test_targeted_up_then_down() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let plugin = plugin_c();

        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("1.0.0-1")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["1.0.0-1"]);
        assert_eq!(executor.history_rows().len(), 1);

        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("2.0.0-1")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["2.0.0-1"]);

        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("1.0.0-1")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.reverted, vec!["2.0.0-1"]);
        assert!(report.applied.is_empty());

        let ids: Vec<String> = executor
            .history_rows()
            .iter()
            .map(|row| row.migration_id.clone())
            .collect();
        assert_eq!(ids, vec!["1.0.0-1"]);
        // the down batch dropped the column and deleted the history row
        let last = executor.batches().into_iter().last().unwrap();
        assert!(last[0].contains("DROP COLUMN \"label\""));
        assert!(last[1].starts_with("DELETE FROM \"__EntityPluginMigrationsHistory\""));
    }

    #[tokio::test]
    async fn test_initial_target_uninstalls_in_descending_order() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let plugin = plugin_c();

        migrator
            .migrate_plugin(&plugin, MigrationTarget::Latest)
            .await
            .unwrap();
        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("initial")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.reverted, vec!["2.0.0-1", "1.0.0-1"]);
        assert!(executor.history_rows().is_empty());
    }

    #[tokio::test]
    async fn test_noop_when_already_at_target() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let plugin = plugin_c();

        migrator
            .migrate_plugin(&plugin, MigrationTarget::Latest)
            .await
            .unwrap();
        let batches_before = executor.batch_count();
        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::Latest)
            .await
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(executor.batch_count(), batches_before);
    }

    #[tokio::test]
    async fn test_failed_unit_is_not_recorded() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        executor.fail_next_containing("c_items");

        let result = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await;
        assert!(matches!(result, Err(MigrateError::Execution(_))));
        assert!(executor.history_rows().is_empty());

        // retry succeeds and resumes from scratch
        let report = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["1.0.0-1", "2.0.0-1"]);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_earlier_steps() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        executor.fail_next_containing("ADD COLUMN");

        let result = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await;
        assert!(result.is_err());

        let ids: Vec<String> = executor
            .history_rows()
            .iter()
            .map(|row| row.migration_id.clone())
            .collect();
        assert_eq!(ids, vec!["1.0.0-1"]);

        // the retry picks up exactly where the failure left off
        let report = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::Latest)
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["2.0.0-1"]);
    }

    #[tokio::test]
    async fn test_history_resorted_semantically() {
        let executor = Arc::new(MemoryExecutor::new());
        // raw string order would put "10.0.0-1" before "2.0.0-1"
        executor.seed_history(HistoryRow {
            plugin: "PluginV".to_string(),
            migration_id: "2.0.0-1".to_string(),
            product_version: "0.2.0".to_string(),
        });
        executor.seed_history(HistoryRow {
            plugin: "PluginV".to_string(),
            migration_id: "10.0.0-1".to_string(),
            product_version: "0.2.0".to_string(),
        });
        let migrator = migrator(executor.clone());

        let plugin = EntityPlugin::builder("PluginV")
            .migration("2.0.0", 1, |m| {
                m.down(drop_table("v_two"));
            })
            .migration("10.0.0", 1, |m| {
                m.down(drop_table("v_ten"));
            })
            .build()
            .unwrap();

        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("initial")).unwrap())
            .await
            .unwrap();
        // descending semantic order: 10.0.0-1 reverts before 2.0.0-1
        assert_eq!(report.reverted, vec!["10.0.0-1", "2.0.0-1"]);
    }

    #[tokio::test]
    async fn test_intermediate_target_reverts_only_above_it() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let plugin = plugin_c();

        migrator
            .migrate_plugin(&plugin, MigrationTarget::Latest)
            .await
            .unwrap();
        // "1.5.0" names no declared migration; it just splits the sequence
        let report = migrator
            .migrate_plugin(&plugin, MigrationTarget::parse(Some("1.5.0")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.reverted, vec!["2.0.0-1"]);
        assert!(report.applied.is_empty());

        let ids: Vec<String> = executor
            .history_rows()
            .iter()
            .map(|row| row.migration_id.clone())
            .collect();
        assert_eq!(ids, vec!["1.0.0-1"]);
    }

    #[tokio::test]
    async fn test_target_above_everything_applies_everything() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let report = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::parse(Some("9.9.9")).unwrap())
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["1.0.0-1", "2.0.0-1"]);

        // already there: the same target is now a no-op
        let report = migrator
            .migrate_plugin(&plugin_c(), MigrationTarget::parse(Some("9.9.9")).unwrap())
            .await
            .unwrap();
        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn test_plan_does_not_execute() {
        let executor = Arc::new(MemoryExecutor::new());
        let migrator = migrator(executor.clone());
        let steps = migrator
            .plan_plugin(&plugin_c(), &MigrationTarget::Latest)
            .await
            .unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].migration_id, "1.0.0-1");
        assert_eq!(steps[0].direction, MigrationDirection::Up);
        assert_eq!(executor.batch_count(), 0);
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(MigrationTarget::parse(None).unwrap(), MigrationTarget::Latest);
        assert_eq!(
            MigrationTarget::parse(Some("initial")).unwrap(),
            MigrationTarget::Initial
        );
        assert!(matches!(
            MigrationTarget::parse(Some("1.2.3-1")).unwrap(),
            MigrationTarget::Version(_)
        ));
        assert!(MigrationTarget::parse(Some("nonsense")).is_err());
    }
}
