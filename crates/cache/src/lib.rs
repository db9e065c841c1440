//! # stratum-cache
//!
//! Second-level entity cache layered over a relational mapper. Each
//! cacheable entity type gets a read-through, write-invalidated cache of
//! denormalized projections, keyed three ways: an id-list key
//! (`{type}_All`), an id key (`{type}_{id}`), and a guid key
//! (`{type}_{guid}`) that resolves to the id. Projections are rebuildable
//! at any time from the backing row and never authoritative.
//!
//! The write path keeps the cache consistent: the persistence layer
//! snapshots pending changes before a commit ([`EntityChanges`]) and
//! replays them into the cache only after the commit succeeds.

use thiserror::Error;

pub mod config;
pub mod entity;
pub mod hooks;
pub mod store;

pub use config::CacheConfig;
pub use entity::{CacheRef, CachedProjection, EntityCache, EntityLoader};
pub use hooks::{ChangeKind, EntityChanges, ValidateEntity, ValidationFailure};
pub use store::{CacheStats, MemoryStore};

/// Cache operation errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store lookup failed
    #[error("Backing store error: {0}")]
    Backend(String),

    /// One or more entities failed validation; nothing was sent to the
    /// database.
    #[error("Validation failed for {} entities", .0.len())]
    Validation(Vec<ValidationFailure>),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
