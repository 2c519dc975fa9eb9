// ── Inventory facade ──
//
// Wires a backend adapter to the store: fetch, normalize, decode, and
// apply under the refresh discipline, plus optimistic writes and the
// periodic background revalidation task.

use std::sync::Arc;
use std::time::Duration;

use netdash_api::{Backend, HttpBackend, ResourcePath};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::aggregate::{self, AlertCounts, DeviceHealthCounts, InterfaceSummary};
use crate::config::InventoryConfig;
use crate::convert::{decode_device_stats, decode_entities, decode_links, decode_payload};
use crate::error::CoreError;
use crate::model::{
    Alert, Device, DeviceStats, EntityId, EntityKind, MacChangeLog, NetworkInterface, Site, Topology,
};
use crate::store::{
    InventoryStore, MutationHandle, MutationOp, RefreshMode, RefreshOutcome, RefreshState, Resource,
    Snapshot,
};

/// Dashboard-level statistics, recomputed from the current snapshots on
/// every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAggregates {
    pub health: DeviceHealthCounts,
    pub alerts: AlertCounts,
    /// Devices with at least one recorded MAC change.
    pub mac_changes: usize,
    /// Device count per site, in site order.
    pub site_devices: Vec<(EntityId, usize)>,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<InventoryInner>`. Owns the backend adapter
/// and the [`InventoryStore`]; every read is a synchronous snapshot.
pub struct Inventory<B: Backend> {
    inner: Arc<InventoryInner<B>>,
}

impl<B: Backend> Clone for Inventory<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct InventoryInner<B> {
    backend: B,
    config: InventoryConfig,
    store: Arc<InventoryStore>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Keeps a periodic refresh alive. Dropping it cancels the task.
#[must_use = "dropping the guard stops the periodic refresh"]
pub struct PeriodicRefresh {
    _guard: DropGuard,
}

impl Inventory<HttpBackend> {
    /// Build an HTTP backend from `config`. Does not touch the network.
    pub fn connect(config: InventoryConfig) -> Result<Self, CoreError> {
        let backend = HttpBackend::new(config.base_url.clone(), config.convention, &config.transport())
            .map_err(|e| CoreError::from_api("backend", e))?;
        info!(url = %config.base_url, "inventory backend configured");
        Ok(Self::new(backend, config))
    }
}

impl<B: Backend> Inventory<B> {
    pub fn new(backend: B, config: InventoryConfig) -> Self {
        Self {
            inner: Arc::new(InventoryInner {
                backend,
                config,
                store: Arc::new(InventoryStore::new()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    // ── Canonical reads ──────────────────────────────────────────────

    pub fn devices(&self) -> Snapshot<Device> {
        self.inner.store.devices()
    }

    pub fn sites(&self) -> Snapshot<Site> {
        self.inner.store.sites()
    }

    pub fn alerts(&self) -> Snapshot<Alert> {
        self.inner.store.alerts()
    }

    pub fn device(&self, id: &EntityId) -> Result<Arc<Device>, CoreError> {
        self.inner.store.device(id).ok_or_else(|| CoreError::NotFound {
            entity: EntityKind::Device.to_string(),
            identifier: id.to_string(),
        })
    }

    pub fn site(&self, id: &EntityId) -> Result<Arc<Site>, CoreError> {
        self.inner.store.site(id).ok_or_else(|| CoreError::NotFound {
            entity: EntityKind::Site.to_string(),
            identifier: id.to_string(),
        })
    }

    pub fn device_aggregates(&self) -> DeviceAggregates {
        let devices = self.devices();
        let sites = self.sites();
        let alerts = self.alerts();
        let mac_changes = self.inner.store.mac_changes();

        DeviceAggregates {
            health: aggregate::device_health(devices.iter().map(Arc::as_ref)),
            alerts: aggregate::alert_counts(alerts.iter().map(Arc::as_ref)),
            mac_changes: aggregate::mac_change_devices(devices.iter().map(Arc::as_ref), mac_changes.iter())
                .len(),
            site_devices: aggregate::site_device_counts(
                sites.iter().map(Arc::as_ref),
                devices.iter().map(Arc::as_ref),
            ),
        }
    }

    /// The interface set of a device, fetched on first use.
    pub async fn interfaces(&self, device_id: &EntityId) -> Result<Arc<Vec<NetworkInterface>>, CoreError> {
        if let Some(cached) = self.inner.store.interfaces(device_id) {
            return Ok(cached);
        }
        self.refresh(Resource::Interfaces(device_id.clone()), RefreshMode::Foreground)
            .await?;
        self.inner
            .store
            .interfaces(device_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "interfaces".into(),
                identifier: device_id.to_string(),
            })
    }

    pub async fn interface_summary(&self, device_id: &EntityId) -> Result<InterfaceSummary, CoreError> {
        let interfaces = self.interfaces(device_id).await?;
        Ok(aggregate::interface_summary(interfaces.iter()))
    }

    /// Replace the externally supplied MAC change log.
    pub fn record_mac_changes(&self, logs: Vec<MacChangeLog>) {
        self.inner.store.set_mac_changes(logs);
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Refresh one resource, honoring the configured fetch deadline.
    ///
    /// A foreground request that coalesces with another foreground one
    /// waits for it and reports its result.
    pub async fn refresh(&self, resource: Resource, mode: RefreshMode) -> Result<RefreshOutcome, CoreError> {
        match self.inner.config.fetch_deadline {
            Some(deadline) => self.refresh_with_deadline(resource, mode, deadline).await,
            None => self.refresh_unbounded(resource, mode).await,
        }
    }

    /// Race a refresh against `deadline`. An exceeded deadline abandons the
    /// fetch, leaves the cache as it was, and is reported as a recoverable
    /// [`CoreError::Timeout`].
    pub async fn refresh_with_deadline(
        &self,
        resource: Resource,
        mode: RefreshMode,
        deadline: Duration,
    ) -> Result<RefreshOutcome, CoreError> {
        match tokio::time::timeout(deadline, self.refresh_unbounded(resource.clone(), mode)).await {
            Ok(result) => result,
            Err(_) => {
                let err = CoreError::Timeout {
                    resource: resource.to_string(),
                    waited_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                };
                warn!(%resource, %mode, "refresh deadline exceeded");
                self.inner.store.record_failure(resource, err.to_string());
                Err(err)
            }
        }
    }

    /// Refresh devices, sites, and alerts concurrently.
    pub async fn refresh_all(&self, mode: RefreshMode) -> Result<(), CoreError> {
        let (devices, sites, alerts) = tokio::join!(
            self.refresh(Resource::Devices, mode),
            self.refresh(Resource::Sites, mode),
            self.refresh(Resource::Alerts, mode),
        );
        devices?;
        sites?;
        alerts?;

        debug!(
            devices = self.inner.store.device_count(),
            sites = self.sites().len(),
            alerts = self.alerts().len(),
            "inventory refresh complete"
        );
        Ok(())
    }

    async fn refresh_unbounded(&self, resource: Resource, mode: RefreshMode) -> Result<RefreshOutcome, CoreError> {
        let store = &self.inner.store;
        let Some(ticket) = store.begin_refresh(resource.clone(), mode) else {
            return match mode {
                RefreshMode::Foreground => self.await_in_flight(&resource).await,
                RefreshMode::Background => Ok(RefreshOutcome::Coalesced),
            };
        };

        let result = match self.inner.backend.fetch(&resource_path(&resource)).await {
            Ok(body) => decode_payload(&resource, body),
            Err(e) => Err(CoreError::from_api(resource.to_string(), e)),
        };
        store.complete(ticket, result)
    }

    async fn await_in_flight(&self, resource: &Resource) -> Result<RefreshOutcome, CoreError> {
        let mut rx = self.inner.store.watch_refresh_state(resource);
        let state = rx
            .wait_for(|s| *s != RefreshState::Loading)
            .await
            .map(|s| s.clone())
            .map_err(|_| CoreError::Internal("inventory store dropped".into()))?;

        match state {
            RefreshState::Failed(message) => Err(CoreError::Transport {
                resource: resource.to_string(),
                status: None,
                message,
            }),
            _ => Ok(RefreshOutcome::Coalesced),
        }
    }

    // ── Optimistic writes ────────────────────────────────────────────

    /// Apply a mutation to the cache only. See
    /// [`InventoryStore::apply_optimistic_mutation`].
    pub fn apply_optimistic_mutation(
        &self,
        kind: EntityKind,
        op: MutationOp,
        payload: Value,
    ) -> Result<MutationHandle, CoreError> {
        self.inner.store.apply_optimistic_mutation(kind, op, payload)
    }

    /// Create an entity: cached immediately under a provisional id, then
    /// re-keyed to the server's id, or removed again if the backend
    /// rejects it. Returns the final id.
    pub async fn create(&self, kind: EntityKind, payload: Value) -> Result<EntityId, CoreError> {
        let handle = self.apply_optimistic_mutation(kind, MutationOp::Create, payload)?;
        let result = self
            .inner
            .backend
            .create(&collection_path(kind), &handle.body)
            .await;
        self.settle(&handle, result)
    }

    /// Update an entity. `payload` carries the `id` and the fields to change.
    pub async fn update(&self, kind: EntityKind, payload: Value) -> Result<EntityId, CoreError> {
        let handle = self.apply_optimistic_mutation(kind, MutationOp::Update, payload)?;
        let result = self
            .inner
            .backend
            .update(&item_path(kind, &handle.id), &handle.body)
            .await;
        self.settle(&handle, result)
    }

    /// Delete an entity. It disappears from the cache before the backend
    /// is even asked, and reappears in place if the backend refuses.
    pub async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), CoreError> {
        let payload = serde_json::to_value(id).map_err(|e| CoreError::Internal(e.to_string()))?;
        let handle = self.apply_optimistic_mutation(kind, MutationOp::Delete, payload)?;
        let result = self.inner.backend.delete(&item_path(kind, &handle.id)).await;
        self.settle(&handle, result).map(|_| ())
    }

    fn settle(
        &self,
        handle: &MutationHandle,
        result: Result<Value, netdash_api::Error>,
    ) -> Result<EntityId, CoreError> {
        match result {
            Ok(body) => {
                let id = self
                    .inner
                    .store
                    .confirm(handle, Some(body))
                    .unwrap_or_else(|| handle.id.clone());
                debug!(kind = %handle.kind, op = %handle.op, %id, "mutation confirmed");
                Ok(id)
            }
            Err(e) => {
                self.inner.store.rollback(handle);
                warn!(kind = %handle.kind, op = %handle.op, id = %handle.id, error = %e, "mutation rejected; rolled back");
                Err(CoreError::from_api(handle.kind.to_string(), e))
            }
        }
    }

    // ── Pass-through reads ───────────────────────────────────────────

    /// Fetch topology links and assemble them with the cached devices.
    /// Devices are fetched first if they have never been loaded.
    pub async fn fetch_topology(&self) -> Result<Topology, CoreError> {
        if self.inner.store.refresh_state(&Resource::Devices) == RefreshState::Idle {
            self.refresh(Resource::Devices, RefreshMode::Foreground).await?;
        }
        let body = self
            .inner
            .backend
            .fetch(&ResourcePath::TopologyLinks)
            .await
            .map_err(|e| CoreError::from_api("topology links", e))?;
        let links = decode_links(body)?;
        let devices = self.devices();
        Ok(Topology::build(devices.iter().map(Arc::as_ref), links.iter()))
    }

    /// Alerts raised for one device, straight from the backend.
    pub async fn device_alerts(&self, device_id: &EntityId) -> Result<Vec<Alert>, CoreError> {
        let resource = format!("alerts of device {device_id}");
        let body = self
            .inner
            .backend
            .fetch(&ResourcePath::DeviceAlerts(device_id.to_string()))
            .await
            .map_err(|e| CoreError::from_api(resource.as_str(), e))?;
        decode_entities(&resource, body)
    }

    /// Latest resource usage sample for one device. Not cached.
    pub async fn device_stats(&self, device_id: &EntityId) -> Result<Option<DeviceStats>, CoreError> {
        let resource = format!("stats of device {device_id}");
        let body = self
            .inner
            .backend
            .fetch(&ResourcePath::DeviceStats(device_id.to_string()))
            .await
            .map_err(|e| CoreError::from_api(resource.as_str(), e))?;
        decode_device_stats(&resource, body)
    }

    /// The backend's own health endpoint.
    pub async fn health_check(&self) -> Result<Value, CoreError> {
        self.inner
            .backend
            .fetch(&ResourcePath::Health)
            .await
            .map_err(|e| CoreError::from_api("health", e))
    }

    // ── Background revalidation ──────────────────────────────────────

    /// Spawn the periodic background refresh, if an interval is configured.
    ///
    /// The task stops when the returned guard is dropped or on
    /// [`shutdown`](Self::shutdown), whichever comes first.
    pub async fn start_periodic_refresh(&self) -> Option<PeriodicRefresh> {
        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs == 0 {
            return None;
        }

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(refresh_task(self.clone(), interval_secs, cancel.clone()));
        self.inner.task_handles.lock().await.push(handle);
        debug!(interval_secs, "periodic refresh started");

        Some(PeriodicRefresh {
            _guard: cancel.drop_guard(),
        })
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("inventory shut down");
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically revalidate the cached collections.
async fn refresh_task<B: Backend>(inventory: Inventory<B>, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = inventory.refresh_all(RefreshMode::Background).await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

// ── Path helpers ─────────────────────────────────────────────────────

fn resource_path(resource: &Resource) -> ResourcePath {
    match resource {
        Resource::Devices => ResourcePath::Devices,
        Resource::Sites => ResourcePath::Sites,
        Resource::Alerts => ResourcePath::Alerts,
        Resource::Interfaces(id) => ResourcePath::DeviceInterfaces(id.to_string()),
    }
}

fn collection_path(kind: EntityKind) -> ResourcePath {
    match kind {
        EntityKind::Device => ResourcePath::Devices,
        EntityKind::Site => ResourcePath::Sites,
        EntityKind::Alert => ResourcePath::Alerts,
    }
}

fn item_path(kind: EntityKind, id: &EntityId) -> ResourcePath {
    let id = id.to_string();
    match kind {
        EntityKind::Device => ResourcePath::Device(id),
        EntityKind::Site => ResourcePath::Site(id),
        EntityKind::Alert => ResourcePath::Alert(id),
    }
}
