//! Read-through, write-invalidated entity cache
//!
//! Each entity type is cached under three logical keys: `{type}_All`
//! (the id list, cost 0), `{type}_{id}` (the projection handle, cost 1)
//! and `{type}_{guid}` (guid-to-id mapping, cost 1). The id and guid
//! entries are added and removed together; every mutation removes the
//! "All" key so the next `get_all` recomputes the id list.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::hooks::ChangeKind;
use crate::store::{CacheStats, MemoryStore};
use crate::CacheResult;

/// Shared handle to a cached projection.
///
/// Handles are live: a later `entity_changed` for the same row updates
/// the projection in place, so any holder of the handle observes the new
/// field values on its next read.
pub type CacheRef<P> = Arc<RwLock<P>>;

/// A denormalized, rebuildable read model of a backing entity
pub trait CachedProjection<E>: Send + Sync + 'static {
    fn id(&self) -> i64;
    fn guid(&self) -> Uuid;

    /// The backing entity's id, used to locate cache entries before a
    /// projection exists
    fn entity_id(entity: &E) -> i64;

    /// Build a fresh projection from the backing entity
    fn from_entity(entity: &E) -> Self;

    /// Refresh this projection's fields from the backing entity
    fn update_from(&mut self, entity: &E);
}

/// Backing-store access for one entity type (the ORM side of the seam)
#[async_trait]
pub trait EntityLoader<E>: Send + Sync {
    async fn load_by_id(&self, id: i64) -> CacheResult<Option<E>>;
    async fn load_by_guid(&self, guid: Uuid) -> CacheResult<Option<E>>;
    async fn load_all_ids(&self) -> CacheResult<Vec<i64>>;
}

/// Second-level cache for one `(entity, projection)` pair
pub struct EntityCache<E, P> {
    store: Arc<MemoryStore>,
    loader: Arc<dyn EntityLoader<E>>,
    type_name: String,
    _projection: PhantomData<fn() -> P>,
}

impl<E, P> EntityCache<E, P>
where
    E: Send + Sync,
    P: CachedProjection<E>,
{
    /// `type_name` prefixes every cache key and must be unique per
    /// registered entity type.
    pub fn new(
        store: Arc<MemoryStore>,
        loader: Arc<dyn EntityLoader<E>>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            loader,
            type_name: type_name.into(),
            _projection: PhantomData,
        }
    }

    fn all_key(&self) -> String {
        format!("{}_All", self.type_name)
    }

    fn id_key(&self, id: i64) -> String {
        format!("{}_{}", self.type_name, id)
    }

    fn guid_key(&self, guid: Uuid) -> String {
        format!("{}_{}", self.type_name, guid)
    }

    /// All cached projections for this type.
    ///
    /// The "All" key caches the identity list only, not payloads: an id
    /// whose entry was evicted since the list was cached is silently
    /// re-fetched from the backing store one row at a time.
    pub async fn get_all(&self) -> CacheResult<Vec<CacheRef<P>>> {
        let ids = match self.store.get_as::<Vec<i64>>(&self.all_key()) {
            Some(ids) => ids.as_ref().clone(),
            None => {
                let ids = self.loader.load_all_ids().await?;
                self.store.insert(&self.all_key(), Arc::new(ids.clone()), 0);
                ids
            }
        };

        let mut projections = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(projection) = self.get_by_id(id).await? {
                projections.push(projection);
            }
        }
        Ok(projections)
    }

    /// Cached projection by id; a miss loads the backing row, populates
    /// both the id and guid entries, and returns the fresh handle.
    /// Loading a nonexistent id returns `None` and caches nothing.
    pub async fn get_by_id(&self, id: i64) -> CacheResult<Option<CacheRef<P>>> {
        if let Some(projection) = self.store.get_as::<RwLock<P>>(&self.id_key(id)) {
            return Ok(Some(projection));
        }
        match self.loader.load_by_id(id).await? {
            Some(entity) => Ok(Some(self.insert_entity(&entity))),
            None => Ok(None),
        }
    }

    /// Cached projection by guid. The guid entry resolves to an id first;
    /// both miss paths (guid miss, id miss after guid hit) funnel through
    /// the same populate logic, keeping the id/guid entries paired.
    pub async fn get_by_guid(&self, guid: Uuid) -> CacheResult<Option<CacheRef<P>>> {
        if let Some(id) = self.store.get_as::<i64>(&self.guid_key(guid)) {
            return self.get_by_id(*id).await;
        }
        match self.loader.load_by_guid(guid).await? {
            Some(entity) => Ok(Some(self.insert_entity(&entity))),
            None => Ok(None),
        }
    }

    /// Drop the id and guid entries for one entity. The "All" key is
    /// removed even when the entity was not cached.
    pub fn remove(&self, id: i64) {
        if let Some(projection) = self.store.get_as::<RwLock<P>>(&self.id_key(id)) {
            let guid = projection.read().guid();
            self.store.remove(&self.guid_key(guid));
            self.store.remove(&self.id_key(id));
        }
        self.store.remove(&self.all_key());
    }

    /// Post-commit write hook. Deletions delegate to [`EntityCache::remove`];
    /// adds and updates either refresh the cached projection in place
    /// (existing handles observe the change) or perform a full add.
    pub fn entity_changed(&self, entity: &E, kind: ChangeKind) {
        let id = P::entity_id(entity);
        if kind == ChangeKind::Deleted {
            tracing::debug!(entity = self.type_name.as_str(), id, "removing deleted entity");
            self.remove(id);
            return;
        }
        match self.store.get_as::<RwLock<P>>(&self.id_key(id)) {
            Some(projection) => {
                projection.write().update_from(entity);
                self.store.remove(&self.all_key());
            }
            None => {
                self.insert_entity(entity);
            }
        }
    }

    /// The single add path: build the projection, store it under the id
    /// key and the guid-to-id key together, and invalidate the id list.
    fn insert_entity(&self, entity: &E) -> CacheRef<P> {
        let projection = P::from_entity(entity);
        let id = projection.id();
        let guid = projection.guid();
        let handle: CacheRef<P> = Arc::new(RwLock::new(projection));

        self.store.insert(&self.id_key(id), handle.clone(), 1);
        self.store.insert(&self.guid_key(guid), Arc::new(id), 1);
        self.store.remove(&self.all_key());
        handle
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}
