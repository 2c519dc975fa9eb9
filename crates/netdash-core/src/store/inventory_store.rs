// ── Central inventory store ──
//
// Owns the canonical device, site, and alert collections plus the
// per-device interface sets. Reads are synchronous snapshot clones; all
// writes are synchronous too, so no lock is ever held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::watch;

use super::collection::Snapshot;
use super::mutation::{MutationHandle, MutationOp, MutationSeq, Tracked};
use super::refresh::{
    RefreshFailure, RefreshMode, RefreshOutcome, RefreshState, RefreshTicket, RefreshTracker,
    Resource,
};
use crate::error::CoreError;
use crate::model::{Alert, Device, EntityId, EntityKind, MacChangeLog, NetworkInterface, Site};
use crate::stream::EntityStream;

/// A decoded, validated refresh response, ready to replace a collection.
#[derive(Debug, Clone)]
pub enum RefreshPayload {
    Devices(Vec<Device>),
    Sites(Vec<Site>),
    Alerts(Vec<Alert>),
    Interfaces(EntityId, Vec<NetworkInterface>),
}

/// The owning cache behind [`Inventory`](crate::Inventory).
///
/// Usable on its own: callers that do their own fetching drive it through
/// [`begin_refresh`](Self::begin_refresh) and [`complete`](Self::complete).
pub struct InventoryStore {
    devices: Tracked<Device>,
    sites: Tracked<Site>,
    alerts: Tracked<Alert>,
    interfaces: RwLock<HashMap<EntityId, Arc<Vec<NetworkInterface>>>>,
    mac_changes: watch::Sender<Arc<Vec<MacChangeLog>>>,
    refresh: Arc<RefreshTracker>,
    mutation_seq: MutationSeq,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryStore {
    pub fn new() -> Self {
        let (mac_changes, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            devices: Tracked::new(),
            sites: Tracked::new(),
            alerts: Tracked::new(),
            interfaces: RwLock::new(HashMap::new()),
            mac_changes,
            refresh: RefreshTracker::new(),
            mutation_seq: MutationSeq::default(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn devices(&self) -> Snapshot<Device> {
        self.devices.items.snapshot()
    }

    pub fn sites(&self) -> Snapshot<Site> {
        self.sites.items.snapshot()
    }

    pub fn alerts(&self) -> Snapshot<Alert> {
        self.alerts.items.snapshot()
    }

    pub fn device(&self, id: &EntityId) -> Option<Arc<Device>> {
        self.devices.items.get(id)
    }

    pub fn site(&self, id: &EntityId) -> Option<Arc<Site>> {
        self.sites.items.get(id)
    }

    /// The cached interface set of a device, if it has been fetched.
    pub fn interfaces(&self, device_id: &EntityId) -> Option<Arc<Vec<NetworkInterface>>> {
        self.interfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device_id)
            .cloned()
    }

    pub fn mac_changes(&self) -> Arc<Vec<MacChangeLog>> {
        self.mac_changes.borrow().clone()
    }

    /// Replace the MAC change log. It is supplied externally, not fetched.
    pub fn set_mac_changes(&self, logs: Vec<MacChangeLog>) {
        self.mac_changes.send_replace(Arc::new(logs));
    }

    pub fn device_count(&self) -> usize {
        self.devices.items.len()
    }

    /// Number of optimistic mutations awaiting backend confirmation.
    pub fn pending_mutations(&self) -> usize {
        self.devices.pending_count() + self.sites.pending_count() + self.alerts.pending_count()
    }

    /// Mutation counter of the device collection.
    pub fn devices_version(&self) -> u64 {
        self.devices.items.version()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_devices(&self) -> EntityStream<Device> {
        EntityStream::new(self.devices.items.subscribe())
    }

    pub fn subscribe_sites(&self) -> EntityStream<Site> {
        EntityStream::new(self.sites.items.subscribe())
    }

    pub fn subscribe_alerts(&self) -> EntityStream<Alert> {
        EntityStream::new(self.alerts.items.subscribe())
    }

    pub fn refresh_state(&self, resource: &Resource) -> RefreshState {
        self.refresh.state(resource)
    }

    pub fn watch_refresh_state(&self, resource: &Resource) -> watch::Receiver<RefreshState> {
        self.refresh.subscribe(resource)
    }

    /// The store-level error signal. Cached data is unaffected by failures.
    pub fn watch_failures(&self) -> watch::Receiver<Option<RefreshFailure>> {
        self.refresh.failures()
    }

    pub fn last_failure(&self) -> Option<RefreshFailure> {
        self.refresh.last_failure()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Start a refresh. `None` means it coalesced with one in flight and
    /// no fetch should be issued.
    pub fn begin_refresh(&self, resource: Resource, mode: RefreshMode) -> Option<RefreshTicket> {
        self.refresh.begin(resource, mode)
    }

    /// Settle a refresh with the fetch result. Stale responses are
    /// discarded; failures never clear cached data.
    pub fn complete(
        &self,
        ticket: RefreshTicket,
        result: Result<RefreshPayload, CoreError>,
    ) -> Result<RefreshOutcome, CoreError> {
        self.refresh.settle(ticket, result, |payload| self.apply_payload(payload))
    }

    pub(crate) fn record_failure(&self, resource: Resource, message: String) {
        self.refresh.publish_failure(resource, message);
    }

    fn apply_payload(&self, payload: RefreshPayload) {
        match payload {
            RefreshPayload::Devices(devices) => self.devices.reconcile(devices),
            RefreshPayload::Sites(sites) => self.sites.reconcile(sites),
            RefreshPayload::Alerts(alerts) => self.alerts.reconcile(alerts),
            RefreshPayload::Interfaces(device_id, interfaces) => {
                self.interfaces
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(device_id, Arc::new(interfaces));
            }
        }
    }

    // ── Optimistic mutations ─────────────────────────────────────────

    /// Apply a create/update/delete to the cache immediately.
    ///
    /// `payload` is an entity body in either field casing; for deletes it
    /// may also be a bare id. The change is visible to readers before this
    /// returns. Resolve the handle with [`confirm`](Self::confirm) or
    /// [`rollback`](Self::rollback) once the backend answers.
    pub fn apply_optimistic_mutation(
        &self,
        kind: EntityKind,
        op: MutationOp,
        payload: Value,
    ) -> Result<MutationHandle, CoreError> {
        let seq = self.mutation_seq.next();
        let handle = match kind {
            EntityKind::Device => self.devices.apply(op, payload, seq),
            EntityKind::Site => self.sites.apply(op, payload, seq),
            EntityKind::Alert => self.alerts.apply(op, payload, seq),
        }?;

        if kind == EntityKind::Device && op == MutationOp::Delete {
            self.interfaces
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&handle.id);
        }
        Ok(handle)
    }

    /// Accept a mutation, adopting the server's representation when given.
    /// Returns the entity's final id, `None` if a refresh already
    /// reconciled the change.
    pub fn confirm(&self, handle: &MutationHandle, server: Option<Value>) -> Option<EntityId> {
        match handle.kind {
            EntityKind::Device => self.devices.confirm(handle, server),
            EntityKind::Site => self.sites.confirm(handle, server),
            EntityKind::Alert => self.alerts.confirm(handle, server),
        }
    }

    /// Undo a mutation the backend rejected.
    pub fn rollback(&self, handle: &MutationHandle) -> bool {
        match handle.kind {
            EntityKind::Device => self.devices.rollback(handle),
            EntityKind::Site => self.sites.rollback(handle),
            EntityKind::Alert => self.alerts.rollback(handle),
        }
    }
}
