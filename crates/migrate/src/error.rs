//! Error types for the plugin migration system.

use thiserror::Error;

use crate::version::SemanticVersion;

/// Result type for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Boxed source error from the underlying execution layer
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for migration operations
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Malformed version string
    #[error("Invalid version string: {0}")]
    Format(String),

    /// The plugin dependency graph contains a cycle
    #[error("Cyclic plugin dependency involving '{0}' - cyclic connections are not allowed")]
    CyclicDependency(String),

    /// A declared cross-plugin minimum-version requirement is not met
    #[error("Unmet dependency: plugin '{plugin}' requires '{dependency}' at version {required} or later")]
    UnmetDependency {
        /// Plugin declaring the unsatisfied dependency
        plugin: String,
        /// Identifier of the plugin the dependency points at
        dependency: String,
        /// Minimum version the dependency requires
        required: SemanticVersion,
    },

    /// Plugin registration error
    #[error("Plugin configuration error: {0}")]
    Configuration(String),

    /// Error surfaced by the underlying SQL execution layer, passed through unchanged
    #[error("Execution error: {0}")]
    Execution(#[source] BoxError),
}

impl From<sqlx::Error> for MigrateError {
    fn from(err: sqlx::Error) -> Self {
        MigrateError::Execution(Box::new(err))
    }
}
