// ── Optimistic mutations ──
//
// A mutation is applied to the cached collection before the backend is
// asked. Each one is recorded in a pending log together with what it
// replaced; when the backend rejects it the log entry is used to roll the
// cache back. A rejected change never overrides a later change to the same
// entity: a later pending change inherits what it replaced, a later
// confirmed change keeps the server's word. A successful full refresh
// reconciles with the server and discards the log for that collection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{Entity, EntityId, EntityKind};
use crate::normalize::normalize_keys;

/// Prefix of ids assigned to entities created locally and not yet
/// confirmed by the backend.
pub const PROVISIONAL_PREFIX: &str = "pending:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MutationOp {
    Create,
    Update,
    Delete,
}

/// Receipt for an applied optimistic mutation. Pass it back to
/// `confirm` or `rollback` once the backend has answered.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationHandle {
    pub kind: EntityKind,
    pub op: MutationOp,
    /// Id of the affected entity in the cache (provisional for creates).
    pub id: EntityId,
    /// Canonical request body for the backend call. Provisional ids are
    /// never included; `Null` for deletes.
    pub body: Value,
    seq: u64,
}

impl MutationHandle {
    pub fn is_provisional(&self) -> bool {
        is_provisional(&self.id)
    }
}

pub fn is_provisional(id: &EntityId) -> bool {
    id.as_text().is_some_and(|s| s.starts_with(PROVISIONAL_PREFIX))
}

struct PendingChange<T> {
    seq: u64,
    op: MutationOp,
    id: EntityId,
    /// Position and value the entity had before the mutation.
    prior: Option<(usize, Arc<T>)>,
}

struct MutationLog<T> {
    pending: Vec<PendingChange<T>>,
    /// Highest confirmed sequence per entity since the last refresh.
    confirmed: HashMap<EntityId, u64>,
}

impl<T> MutationLog<T> {
    fn clear(&mut self) {
        self.pending.clear();
        self.confirmed.clear();
    }

    fn confirmed_after(&self, id: &EntityId, seq: u64) -> bool {
        self.confirmed.get(id).is_some_and(|&confirmed| confirmed > seq)
    }
}

/// A collection plus its log of unconfirmed optimistic changes.
pub(crate) struct Tracked<T: Entity> {
    pub(crate) items: EntityCollection<T>,
    log: Mutex<MutationLog<T>>,
}

impl<T: Entity> Tracked<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: EntityCollection::new(),
            log: Mutex::new(MutationLog {
                pending: Vec::new(),
                confirmed: HashMap::new(),
            }),
        }
    }

    /// Wholesale replacement from a successful refresh. Pending changes
    /// are reconciled by the server's view and dropped.
    pub(crate) fn reconcile(&self, entities: Vec<T>) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        if !log.pending.is_empty() {
            debug!(kind = %T::KIND, discarded = log.pending.len(), "refresh reconciled pending mutations");
        }
        log.clear();
        self.items.replace_all(entities);
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }

    /// Apply a mutation to the cache. `payload` is key-normalized first,
    /// so either backend's field casing is accepted.
    pub(crate) fn apply(
        &self,
        op: MutationOp,
        payload: Value,
        seq: u64,
    ) -> Result<MutationHandle, CoreError> {
        let payload = normalize_keys(payload);
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);

        let (id, body, prior) = match op {
            MutationOp::Create => {
                let mut object = into_object(payload)?;
                let body = Value::Object(object.clone());
                let id = match object.get("id").filter(|v| !v.is_null()) {
                    Some(raw) => parse_id(raw)?,
                    None => {
                        let id = EntityId::Text(format!("{PROVISIONAL_PREFIX}{seq}"));
                        object.insert("id".into(), Value::String(id.to_string()));
                        id
                    }
                };
                let entity: T = decode(Value::Object(object))?;
                entity.validate()?;
                let prior = self.items.upsert(entity);
                (id, body, prior)
            }
            MutationOp::Update => {
                let patch = into_object(payload)?;
                let id = patch
                    .get("id")
                    .ok_or_else(missing_id)
                    .and_then(parse_id)?;
                let current = self.items.get(&id).ok_or_else(|| not_found::<T>(&id))?;
                let mut merged = into_object(serde_json::to_value(current.as_ref()).map_err(
                    |e| CoreError::Internal(format!("re-encoding cached {}: {e}", T::KIND)),
                )?)?;
                merged.extend(patch);
                let entity: T = decode(Value::Object(merged))?;
                entity.validate()?;
                let body = serde_json::to_value(&entity)
                    .map_err(|e| CoreError::Internal(format!("encoding {}: {e}", T::KIND)))?;
                let prior = self.items.replace(&id, entity);
                (id, body, prior)
            }
            MutationOp::Delete => {
                let id = match &payload {
                    Value::Object(map) => map.get("id").ok_or_else(missing_id).and_then(parse_id)?,
                    other => parse_id(other)?,
                };
                let prior = self
                    .items
                    .remove(&id)
                    .ok_or_else(|| not_found::<T>(&id))?;
                (id, Value::Null, Some(prior))
            }
        };

        log.pending.push(PendingChange {
            seq,
            op,
            id: id.clone(),
            prior,
        });
        debug!(kind = %T::KIND, %op, %id, "optimistic mutation applied");

        Ok(MutationHandle {
            kind: T::KIND,
            op,
            id,
            body,
            seq,
        })
    }

    /// The backend accepted the mutation. For creates and updates the
    /// server's representation, when it decodes, replaces the optimistic
    /// one (re-keying a provisional id). Returns the entity's final id, or
    /// `None` if the change was already reconciled by a refresh.
    pub(crate) fn confirm(&self, handle: &MutationHandle, server: Option<Value>) -> Option<EntityId> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let pos = log.pending.iter().position(|c| c.seq == handle.seq)?;
        let change = log.pending.remove(pos);
        log.confirmed.insert(change.id.clone(), change.seq);

        if change.op == MutationOp::Delete {
            return Some(change.id);
        }
        let Some(body) = server.filter(Value::is_object) else {
            return Some(change.id);
        };
        match serde_json::from_value::<T>(normalize_keys(body)) {
            Ok(entity) => {
                let id = entity.entity_id().clone();
                log.confirmed.insert(id.clone(), change.seq);
                self.items.replace(&change.id, entity);
                Some(id)
            }
            Err(err) => {
                warn!(kind = %T::KIND, id = %change.id, error = %err, "keeping optimistic value; server body did not decode");
                Some(change.id)
            }
        }
    }

    /// The backend rejected the mutation: restore what it replaced, unless
    /// a later change to the same entity owns the cached value now.
    /// Returns `false` if the change was already reconciled by a refresh.
    pub(crate) fn rollback(&self, handle: &MutationHandle) -> bool {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = log.pending.iter().position(|c| c.seq == handle.seq) else {
            return false;
        };
        let change = log.pending.remove(pos);

        let successor = log
            .pending
            .iter_mut()
            .filter(|c| c.id == change.id && c.seq > change.seq)
            .min_by_key(|c| c.seq);
        if let Some(successor) = successor {
            // The cache holds the successor's value; should it fail too,
            // it must restore what existed before this change.
            successor.prior = change.prior;
            debug!(kind = %T::KIND, op = %change.op, id = %change.id, "rejected mutation handed its prior value to a pending one");
            return true;
        }
        if log.confirmed_after(&change.id, change.seq) {
            debug!(kind = %T::KIND, op = %change.op, id = %change.id, "rejected mutation superseded by a confirmed one");
            return true;
        }

        match change.prior {
            Some((index, prior)) => {
                if change.op != MutationOp::Delete {
                    self.items.remove(&change.id);
                }
                self.items.insert_at(index, prior);
            }
            // Nothing existed before: a create, or a change that inherited
            // a rejected create's empty prior.
            None => {
                if change.op != MutationOp::Delete {
                    self.items.remove(&change.id);
                }
            }
        }
        debug!(kind = %T::KIND, op = %change.op, id = %change.id, "optimistic mutation rolled back");
        true
    }
}

/// Monotonic source of mutation sequence numbers (and provisional ids).
#[derive(Debug, Default)]
pub(crate) struct MutationSeq(AtomicU64);

impl MutationSeq {
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn into_object(value: Value) -> Result<Map<String, Value>, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Validation {
            field: "payload".into(),
            reason: format!("expected an object, got {}", json_kind(&other)),
        }),
    }
}

fn parse_id(raw: &Value) -> Result<EntityId, CoreError> {
    serde_json::from_value(raw.clone()).map_err(|_| CoreError::Validation {
        field: "id".into(),
        reason: format!("expected a number or string, got {}", json_kind(raw)),
    })
}

fn decode<T: Entity>(value: Value) -> Result<T, CoreError> {
    serde_json::from_value(value).map_err(|e| CoreError::Validation {
        field: T::KIND.to_string(),
        reason: e.to_string(),
    })
}

fn missing_id() -> CoreError {
    CoreError::Validation {
        field: "id".into(),
        reason: "required".into(),
    }
}

fn not_found<T: Entity>(id: &EntityId) -> CoreError {
    CoreError::NotFound {
        entity: T::KIND.to_string(),
        identifier: id.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{Device, Site};

    fn sites() -> Tracked<Site> {
        let tracked = Tracked::new();
        tracked.reconcile(
            serde_json::from_value(json!([
                { "id": 1, "siteName": "HQ" },
                { "id": 2, "siteName": "Branch" }
            ]))
            .unwrap(),
        );
        tracked
    }

    fn names(tracked: &Tracked<Site>) -> Vec<String> {
        tracked
            .items
            .snapshot()
            .iter()
            .map(|s| s.site_name.clone())
            .collect()
    }

    #[test]
    fn create_gets_provisional_id_and_snake_case_is_accepted() {
        let tracked = sites();
        let handle = tracked
            .apply(MutationOp::Create, json!({ "site_name": "Lab" }), 7)
            .unwrap();

        assert!(handle.is_provisional());
        assert_eq!(handle.id, EntityId::Text("pending:7".into()));
        assert_eq!(handle.body, json!({ "siteName": "Lab" }));
        assert_eq!(names(&tracked), ["HQ", "Branch", "Lab"]);
    }

    #[test]
    fn confirm_rekeys_provisional_entity() {
        let tracked = sites();
        let handle = tracked
            .apply(MutationOp::Create, json!({ "siteName": "Lab" }), 1)
            .unwrap();

        let id = tracked.confirm(&handle, Some(json!({ "id": 3, "site_name": "Lab" })));
        assert_eq!(id, Some(EntityId::Numeric(3)));

        assert!(tracked.items.get(&handle.id).is_none());
        assert!(tracked.items.get(&EntityId::Numeric(3)).is_some());
        assert_eq!(tracked.pending_count(), 0);
    }

    #[test]
    fn invalid_payload_is_rejected_without_touching_cache() {
        let tracked = sites();
        let err = tracked
            .apply(MutationOp::Create, json!({ "siteName": "X" }), 1)
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "siteName"));
        assert_eq!(names(&tracked), ["HQ", "Branch"]);
        assert_eq!(tracked.pending_count(), 0);
    }

    #[test]
    fn update_merges_and_rolls_back_in_place() {
        let tracked = sites();
        let handle = tracked
            .apply(MutationOp::Update, json!({ "id": 1, "location": "Berlin" }), 1)
            .unwrap();

        let updated = tracked.items.get(&EntityId::Numeric(1)).unwrap();
        assert_eq!(updated.site_name, "HQ");
        assert_eq!(updated.location.as_deref(), Some("Berlin"));

        assert!(tracked.rollback(&handle));
        assert_eq!(tracked.items.get(&EntityId::Numeric(1)).unwrap().location, None);
        assert_eq!(names(&tracked), ["HQ", "Branch"]);
    }

    #[test]
    fn delete_is_immediate_and_rollback_restores_position() {
        let tracked = sites();
        let handle = tracked.apply(MutationOp::Delete, json!(1), 1).unwrap();

        assert_eq!(names(&tracked), ["Branch"]);

        assert!(tracked.rollback(&handle));
        assert_eq!(names(&tracked), ["HQ", "Branch"]);
    }

    #[test]
    fn missing_entities_are_not_found() {
        let tracked = sites();
        let err = tracked.apply(MutationOp::Delete, json!({ "id": 99 }), 1).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn refresh_discards_pending_log() {
        let tracked = sites();
        let handle = tracked.apply(MutationOp::Delete, json!("2"), 1).unwrap();
        tracked.reconcile(serde_json::from_value(json!([{ "id": 1, "siteName": "HQ" }])).unwrap());

        assert!(!tracked.rollback(&handle));
        assert_eq!(names(&tracked), ["HQ"]);
    }

    #[test]
    fn rejected_update_after_confirmed_delete_stays_deleted() {
        let tracked = sites();
        let update = tracked
            .apply(MutationOp::Update, json!({ "id": 1, "location": "Berlin" }), 1)
            .unwrap();
        let delete = tracked.apply(MutationOp::Delete, json!(1), 2).unwrap();

        assert_eq!(tracked.confirm(&delete, None), Some(EntityId::Numeric(1)));
        assert!(tracked.rollback(&update));

        assert_eq!(names(&tracked), ["Branch"]);
        assert_eq!(tracked.pending_count(), 0);
    }

    #[test]
    fn rejected_update_after_confirmed_update_keeps_later_value() {
        let tracked = sites();
        let first = tracked
            .apply(MutationOp::Update, json!({ "id": 1, "location": "Berlin" }), 1)
            .unwrap();
        let second = tracked
            .apply(MutationOp::Update, json!({ "id": 1, "location": "Paris" }), 2)
            .unwrap();

        tracked.confirm(&second, None);
        assert!(tracked.rollback(&first));

        let site = tracked.items.get(&EntityId::Numeric(1)).unwrap();
        assert_eq!(site.location.as_deref(), Some("Paris"));
    }

    #[test]
    fn overlapping_rejections_restore_the_original() {
        let tracked = sites();
        let update = tracked
            .apply(MutationOp::Update, json!({ "id": 1, "location": "Berlin" }), 1)
            .unwrap();
        let delete = tracked.apply(MutationOp::Delete, json!(1), 2).unwrap();

        // Earlier change rejected first: the pending delete still stands.
        assert!(tracked.rollback(&update));
        assert_eq!(names(&tracked), ["Branch"]);

        assert!(tracked.rollback(&delete));
        assert_eq!(names(&tracked), ["HQ", "Branch"]);
        assert_eq!(tracked.items.get(&EntityId::Numeric(1)).unwrap().location, None);
    }

    #[test]
    fn update_of_rejected_create_is_removed_on_rejection() {
        let tracked = sites();
        let create = tracked
            .apply(MutationOp::Create, json!({ "siteName": "Lab" }), 1)
            .unwrap();
        let update = tracked
            .apply(
                MutationOp::Update,
                json!({ "id": create.id.to_string(), "location": "Oslo" }),
                2,
            )
            .unwrap();

        assert!(tracked.rollback(&create));
        assert_eq!(names(&tracked), ["HQ", "Branch", "Lab"]);
        assert!(tracked.rollback(&update));
        assert_eq!(names(&tracked), ["HQ", "Branch"]);
    }

    #[test]
    fn device_create_requires_address() {
        let tracked: Tracked<Device> = Tracked::new();
        let err = tracked
            .apply(MutationOp::Create, json!({ "hostname": "edge" }), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
