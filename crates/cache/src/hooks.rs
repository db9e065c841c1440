//! Write-path integration
//!
//! Change kind information (added/modified/deleted) only exists before a
//! commit, but the cache must only change after the commit succeeds. The
//! persistence layer therefore snapshots its tracked entities into an
//! [`EntityChanges`] buffer before committing and replays the buffer into
//! the cache afterwards; a failed commit discards the buffer and the
//! cache stays untouched.

use serde::{Deserialize, Serialize};

use crate::entity::{CachedProjection, EntityCache};
use crate::{CacheError, CacheResult};

/// Pending change kind of a tracked entity at snapshot time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// Validation outcome for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Human-readable identity of the failing entity
    pub entity: String,
    pub messages: Vec<String>,
}

/// Entity-level validation run before anything is sent to the database
pub trait ValidateEntity {
    /// Short identity used in failure reports, e.g. `"User(42)"`
    fn label(&self) -> String;

    /// Rule violations, empty when the entity is valid
    fn validate(&self) -> Vec<String>;
}

/// Pre-commit snapshot of cacheable entities and their change kinds
pub struct EntityChanges<E> {
    pending: Vec<(E, ChangeKind)>,
}

impl<E> Default for EntityChanges<E> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<E> EntityChanges<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot one tracked entity with its pending change kind
    pub fn record(&mut self, entity: E, kind: ChangeKind) {
        self.pending.push((entity, kind));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Validate every snapshotted entity, aggregating all failures into
    /// one error so a save either fully validates or fully aborts before
    /// any SQL is sent.
    pub fn validate_all(&self) -> CacheResult<()>
    where
        E: ValidateEntity,
    {
        let failures: Vec<ValidationFailure> = self
            .pending
            .iter()
            .filter_map(|(entity, _)| {
                let messages = entity.validate();
                if messages.is_empty() {
                    None
                } else {
                    Some(ValidationFailure {
                        entity: entity.label(),
                        messages,
                    })
                }
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CacheError::Validation(failures))
        }
    }

    /// Replay the snapshot into the cache after a successful commit.
    /// Each snapshotted entity is dispatched exactly once; the buffer is
    /// left empty.
    pub fn committed<P>(&mut self, cache: &EntityCache<E, P>)
    where
        E: Send + Sync,
        P: CachedProjection<E>,
    {
        for (entity, kind) in self.pending.drain(..) {
            cache.entity_changed(&entity, kind);
        }
    }

    /// Drop the snapshot without touching the cache (commit failed)
    pub fn discard(&mut self) {
        self.pending.clear();
    }
}
