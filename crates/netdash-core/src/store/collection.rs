// ── Generic reactive entity collection ──
//
// Ordered storage keyed by `EntityId` with push-based change notification
// via `watch` channels. Order is the backend's response order; optimistic
// mutations keep each entity at its position.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{Entity, EntityId};

/// Snapshot handed to readers. Cheap to clone; never mutated in place.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// An ordered, reactive collection for a single entity type.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive. The write lock is never held across an `.await`.
pub(crate) struct EntityCollection<T: Entity> {
    items: RwLock<IndexMap<EntityId, Arc<T>>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Entity> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            items: RwLock::new(IndexMap::new()),
            version,
            snapshot,
        }
    }

    /// Replace the whole collection, keeping `entities` order. A duplicate
    /// id keeps its first position and its last value.
    pub(crate) fn replace_all(&self, entities: Vec<T>) {
        let fresh: IndexMap<EntityId, Arc<T>> = entities
            .into_iter()
            .map(|e| (e.entity_id().clone(), Arc::new(e)))
            .collect();
        self.mutate(|items| *items = fresh);
    }

    /// Append an entity, or replace it in place if the id already exists.
    /// Returns the previous position and value, if any.
    pub(crate) fn upsert(&self, entity: T) -> Option<(usize, Arc<T>)> {
        let id = entity.entity_id().clone();
        self.mutate(|items| {
            let (index, prior) = items.insert_full(id, Arc::new(entity));
            prior.map(|p| (index, p))
        })
    }

    /// Replace the entity stored under `id`, possibly under a new id, at
    /// the same position. Returns `None` (and changes nothing) if `id` is
    /// not present.
    pub(crate) fn replace(&self, id: &EntityId, entity: T) -> Option<(usize, Arc<T>)> {
        self.mutate(|items| {
            let (index, _, prior) = items.shift_remove_full(id)?;
            let new_id = entity.entity_id().clone();
            // A server-assigned id may collide with an existing entry.
            items.shift_remove(&new_id);
            let index = index.min(items.len());
            items.shift_insert(index, new_id, Arc::new(entity));
            Some((index, prior))
        })
    }

    /// Insert at `index` (clamped to the end).
    pub(crate) fn insert_at(&self, index: usize, entity: Arc<T>) {
        let id = entity.entity_id().clone();
        self.mutate(|items| {
            items.shift_remove(&id);
            let index = index.min(items.len());
            items.shift_insert(index, id, entity);
        });
    }

    /// Remove an entity, returning its former position and value.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<(usize, Arc<T>)> {
        self.mutate(|items| items.shift_remove_full(id).map(|(i, _, v)| (i, v)))
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Run `f` under the write lock, then publish a new snapshot while the
    /// lock is still held so snapshots are published in mutation order.
    fn mutate<R>(&self, f: impl FnOnce(&mut IndexMap<EntityId, Arc<T>>) -> R) -> R {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut items);
        let values: Vec<Arc<T>> = items.values().map(Arc::clone).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
        result
    }
}
