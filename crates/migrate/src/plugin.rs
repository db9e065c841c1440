//! Plugins and migration descriptors
//!
//! A plugin owns an ordered list of migration descriptors built once at
//! registration time. Declarations go through [`EntityPluginBuilder`]
//! rather than runtime reflection: each migration names its version and
//! step explicitly, and the step is appended internally as the version's
//! prerelease segment (so version `"1.0.0"` step 2 becomes `"1.0.0-2"`).

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};
use crate::operations::SchemaOperation;
use crate::version::SemanticVersion;

/// A cross-plugin minimum-version requirement declared by a migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationDependency {
    /// Identifier of the plugin this dependency points at
    pub plugin: String,
    /// Minimum version (including step) that must be applied
    pub min_version: SemanticVersion,
}

/// Static metadata for one migration, created at plugin-registration time
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationDescriptor {
    /// Identifier of the owning plugin
    pub plugin: String,
    /// The migration id: declared version with the step as prerelease
    pub version: SemanticVersion,
    /// Cross-plugin requirements that must hold when this migration applies
    pub dependencies: Vec<MigrationDependency>,
    /// Forward schema changes
    pub up: Vec<SchemaOperation>,
    /// Backward schema changes
    pub down: Vec<SchemaOperation>,
}

impl MigrationDescriptor {
    /// The string form stored in the history table
    pub fn migration_id(&self) -> String {
        self.version.to_string()
    }
}

/// A named, independently versioned unit owning zero or more migrations.
/// The identifier is the durable key stored in history and must remain
/// stable across releases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPlugin {
    identifier: String,
    migrations: Vec<MigrationDescriptor>,
}

impl EntityPlugin {
    pub fn builder(identifier: impl Into<String>) -> EntityPluginBuilder {
        EntityPluginBuilder {
            identifier: identifier.into(),
            migrations: Vec::new(),
            error: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Migration descriptors in declaration order
    pub fn migrations(&self) -> &[MigrationDescriptor] {
        &self.migrations
    }
}

/// Parse a declared version string and append the step as its prerelease
/// segment. Declared strings must not smuggle a prerelease of their own.
fn parse_declared_version(text: &str, step: u32) -> MigrateResult<SemanticVersion> {
    if text.contains('-') {
        return Err(MigrateError::Format(format!(
            "'{}' must not contain a prerelease tag; declare the step separately",
            text
        )));
    }
    Ok(SemanticVersion::parse(text)?.with_prerelease(step.to_string()))
}

/// Fluent builder for [`EntityPlugin`]. Parse failures are deferred and
/// surfaced by [`EntityPluginBuilder::build`].
pub struct EntityPluginBuilder {
    identifier: String,
    migrations: Vec<MigrationDescriptor>,
    error: Option<MigrateError>,
}

impl EntityPluginBuilder {
    /// Declare a migration at `version`/`step` and describe it through the
    /// callback.
    pub fn migration<F>(mut self, version: &str, step: u32, configure: F) -> Self
    where
        F: FnOnce(&mut MigrationBuilder),
    {
        if self.error.is_some() {
            return self;
        }
        match parse_declared_version(version, step) {
            Ok(parsed) => {
                let mut builder = MigrationBuilder {
                    descriptor: MigrationDescriptor {
                        plugin: self.identifier.clone(),
                        version: parsed,
                        dependencies: Vec::new(),
                        up: Vec::new(),
                        down: Vec::new(),
                    },
                    error: None,
                };
                configure(&mut builder);
                match builder.error {
                    Some(err) => self.error = Some(err),
                    None => self.migrations.push(builder.descriptor),
                }
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn build(self) -> MigrateResult<EntityPlugin> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut seen: Vec<&SemanticVersion> = Vec::new();
        for migration in &self.migrations {
            if seen.contains(&&migration.version) {
                return Err(MigrateError::Configuration(format!(
                    "plugin '{}' declares migration '{}' more than once",
                    self.identifier, migration.version
                )));
            }
            seen.push(&migration.version);
        }
        Ok(EntityPlugin {
            identifier: self.identifier,
            migrations: self.migrations,
        })
    }
}

/// Builder for a single migration's operations and dependencies
pub struct MigrationBuilder {
    descriptor: MigrationDescriptor,
    error: Option<MigrateError>,
}

impl MigrationBuilder {
    /// Add a forward schema operation
    pub fn up(&mut self, operation: SchemaOperation) -> &mut Self {
        self.descriptor.up.push(operation);
        self
    }

    /// Add a backward schema operation
    pub fn down(&mut self, operation: SchemaOperation) -> &mut Self {
        self.descriptor.down.push(operation);
        self
    }

    /// Require `plugin` at `version` (step 1, the first step of that
    /// version) before this migration applies.
    pub fn depends_on(&mut self, plugin: &str, version: &str) -> &mut Self {
        self.depends_on_step(plugin, version, 1)
    }

    /// Require `plugin` at `version`/`step` before this migration applies
    pub fn depends_on_step(&mut self, plugin: &str, version: &str, step: u32) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match parse_declared_version(version, step) {
            Ok(min_version) => self.descriptor.dependencies.push(MigrationDependency {
                plugin: plugin.to_string(),
                min_version,
            }),
            Err(err) => self.error = Some(err),
        }
        self
    }
}

/// An ordered, identifier-unique collection of plugins
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<EntityPlugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, rejecting duplicate identifiers
    pub fn register(&mut self, plugin: EntityPlugin) -> MigrateResult<()> {
        if self.get(plugin.identifier()).is_some() {
            return Err(MigrateError::Configuration(format!(
                "plugin '{}' is already registered",
                plugin.identifier()
            )));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&EntityPlugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.identifier() == identifier)
    }

    /// Plugins in registration order
    pub fn iter(&self) -> impl Iterator<Item = &EntityPlugin> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{ColumnDef, ColumnType};

    fn sample_plugin() -> EntityPlugin {
        EntityPlugin::builder("PluginA")
            .migration("1.0.0", 1, |m| {
                m.up(SchemaOperation::CreateTable {
                    name: "a_items".to_string(),
                    columns: vec![ColumnDef::new("id", ColumnType::BigSerial).not_null()],
                    primary_key: vec!["id".to_string()],
                })
                .down(SchemaOperation::DropTable {
                    name: "a_items".to_string(),
                })
                .depends_on("PluginB", "1.0.0");
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_step_becomes_prerelease() {
        let plugin = sample_plugin();
        assert_eq!(plugin.migrations()[0].migration_id(), "1.0.0-1");
    }

    #[test]
    fn test_dependency_defaults_to_first_step() {
        let plugin = sample_plugin();
        let dependency = &plugin.migrations()[0].dependencies[0];
        assert_eq!(dependency.plugin, "PluginB");
        assert_eq!(dependency.min_version.to_string(), "1.0.0-1");
    }

    #[test]
    fn test_declared_prerelease_is_rejected() {
        let result = EntityPlugin::builder("PluginA")
            .migration("1.0.0-beta", 1, |_| {})
            .build();
        assert!(matches!(result, Err(MigrateError::Format(_))));

        let result = EntityPlugin::builder("PluginA")
            .migration("1.0.0", 1, |m| {
                m.depends_on("PluginB", "-");
            })
            .build();
        assert!(matches!(result, Err(MigrateError::Format(_))));
    }

    #[test]
    fn test_duplicate_migration_versions_rejected() {
        let result = EntityPlugin::builder("PluginA")
            .migration("1.0.0", 1, |_| {})
            .migration("1.0.0", 1, |_| {})
            .build();
        assert!(matches!(result, Err(MigrateError::Configuration(_))));
    }

    #[test]
    fn test_registry_rejects_duplicate_identifiers() {
        let mut registry = PluginRegistry::new();
        registry.register(sample_plugin()).unwrap();
        let result = registry.register(sample_plugin());
        assert!(matches!(result, Err(MigrateError::Configuration(_))));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("PluginA").is_some());
    }
}
