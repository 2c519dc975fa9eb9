// ── Refresh lifecycle ──
//
// One state machine per resource: Idle → Loading → {Ready, Failed}.
// Every fetch is tagged with a per-resource sequence number; a response
// older than the newest applied one is discarded, so a slow early request
// can never overwrite newer data.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::EntityId;

/// A refreshable resource set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Devices,
    Sites,
    Alerts,
    /// The interface set of one device.
    Interfaces(EntityId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devices => f.write_str("devices"),
            Self::Sites => f.write_str("sites"),
            Self::Alerts => f.write_str("alerts"),
            Self::Interfaces(id) => write!(f, "interfaces of device {id}"),
        }
    }
}

/// Who asked for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RefreshMode {
    /// A caller is waiting for fresh data. Failures are returned to it and
    /// leave the resource `Failed`.
    Foreground,
    /// Periodic revalidation. Coalesces with anything in flight; failures
    /// keep the cache and resource state, and surface via
    /// [`RefreshTracker::failures`].
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What happened to a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was applied to the cache.
    Applied,
    /// A newer response had already been applied; this one was dropped.
    Stale,
    /// Another refresh was already in flight; no fetch was issued.
    Coalesced,
}

/// The store-level error signal, kept apart from cached data.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshFailure {
    pub resource: Resource,
    pub message: String,
    pub at: DateTime<Utc>,
}

struct Slot {
    next_seq: u64,
    applied: u64,
    loaded: bool,
    in_flight: Vec<(u64, RefreshMode)>,
    state: watch::Sender<RefreshState>,
}

impl Slot {
    fn new() -> Self {
        let (state, _) = watch::channel(RefreshState::Idle);
        Self {
            next_seq: 0,
            applied: 0,
            loaded: false,
            in_flight: Vec::new(),
            state,
        }
    }

    /// `true` while a request newer than the last applied one is pending.
    fn awaiting_newer(&self) -> bool {
        self.in_flight.iter().any(|(seq, _)| *seq > self.applied)
    }

    fn settle_state(&self, state: RefreshState) {
        if !self.awaiting_newer() {
            self.state.send_replace(state);
        }
    }

    fn resting_state(&self) -> RefreshState {
        if self.loaded {
            RefreshState::Ready
        } else {
            RefreshState::Idle
        }
    }
}

/// Sequence bookkeeping and state channels for every resource.
pub struct RefreshTracker {
    slots: Mutex<HashMap<Resource, Slot>>,
    failures: watch::Sender<Option<RefreshFailure>>,
}

/// Proof that a fetch was issued. Must be settled through
/// [`RefreshTracker::settle`]; dropping it unsettled (for instance when a
/// deadline cancels the fetch) withdraws the request.
#[must_use = "an unsettled ticket withdraws its refresh when dropped"]
pub struct RefreshTicket {
    tracker: Arc<RefreshTracker>,
    resource: Resource,
    seq: u64,
    mode: RefreshMode,
    settled: bool,
}

impl RefreshTicket {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }
}

impl Drop for RefreshTicket {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.withdraw(&self.resource, self.seq);
        }
    }
}

impl RefreshTracker {
    pub fn new() -> Arc<Self> {
        let (failures, _) = watch::channel(None);
        Arc::new(Self {
            slots: Mutex::new(HashMap::new()),
            failures,
        })
    }

    /// Request a fetch for `resource`.
    ///
    /// Returns `None` when the request coalesces with one already in
    /// flight: a background request coalesces with anything, a foreground
    /// request only with another foreground one. A foreground request
    /// issued over an in-flight background one gets a newer sequence
    /// number, so whichever order the two responses arrive in, the
    /// foreground data wins.
    pub fn begin(self: &Arc<Self>, resource: Resource, mode: RefreshMode) -> Option<RefreshTicket> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(resource.clone()).or_insert_with(Slot::new);

        let coalesce = match mode {
            RefreshMode::Background => !slot.in_flight.is_empty(),
            RefreshMode::Foreground => slot
                .in_flight
                .iter()
                .any(|(_, m)| *m == RefreshMode::Foreground),
        };
        if coalesce {
            debug!(%resource, %mode, "refresh coalesced with in-flight request");
            return None;
        }

        slot.next_seq += 1;
        let seq = slot.next_seq;
        slot.in_flight.push((seq, mode));
        slot.state.send_replace(RefreshState::Loading);
        debug!(%resource, %mode, seq, "refresh started");

        Some(RefreshTicket {
            tracker: Arc::clone(self),
            resource,
            seq,
            mode,
            settled: false,
        })
    }

    /// Settle a ticket with its fetch result.
    ///
    /// `apply` runs only when the response is current, under the tracker
    /// lock, so two responses for the same resource can never interleave
    /// their cache writes.
    pub fn settle<P>(
        &self,
        mut ticket: RefreshTicket,
        result: Result<P, CoreError>,
        apply: impl FnOnce(P),
    ) -> Result<RefreshOutcome, CoreError> {
        ticket.settled = true;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = slots.get_mut(&ticket.resource) else {
            return Err(CoreError::Internal(format!(
                "refresh ticket for unknown resource {}",
                ticket.resource
            )));
        };
        slot.in_flight.retain(|(seq, _)| *seq != ticket.seq);

        if ticket.seq < slot.applied {
            debug!(
                resource = %ticket.resource,
                seq = ticket.seq,
                applied = slot.applied,
                "discarding stale refresh response"
            );
            return Ok(RefreshOutcome::Stale);
        }

        match result {
            Ok(payload) => {
                apply(payload);
                slot.applied = ticket.seq;
                slot.loaded = true;
                slot.settle_state(RefreshState::Ready);
                self.failures.send_if_modified(|current| {
                    let clear = current
                        .as_ref()
                        .is_some_and(|f| f.resource == ticket.resource);
                    if clear {
                        *current = None;
                    }
                    clear
                });
                debug!(resource = %ticket.resource, seq = ticket.seq, "refresh applied");
                Ok(RefreshOutcome::Applied)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(
                    resource = %ticket.resource,
                    mode = %ticket.mode,
                    error = %message,
                    "refresh failed"
                );
                self.publish_failure(ticket.resource.clone(), message.clone());
                match ticket.mode {
                    RefreshMode::Foreground => slot.settle_state(RefreshState::Failed(message)),
                    RefreshMode::Background if slot.loaded => {
                        slot.settle_state(RefreshState::Ready);
                    }
                    RefreshMode::Background => slot.settle_state(RefreshState::Failed(message)),
                }
                Err(err)
            }
        }
    }

    /// Record a failure that happened outside `settle`, e.g. a deadline.
    pub fn publish_failure(&self, resource: Resource, message: String) {
        self.failures.send_replace(Some(RefreshFailure {
            resource,
            message,
            at: Utc::now(),
        }));
    }

    pub fn state(&self, resource: &Resource) -> RefreshState {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .map(|slot| slot.state.borrow().clone())
            .unwrap_or_default()
    }

    /// Watch the state of one resource.
    pub fn subscribe(&self, resource: &Resource) -> watch::Receiver<RefreshState> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(resource.clone())
            .or_insert_with(Slot::new)
            .state
            .subscribe()
    }

    /// Watch the most recent refresh failure. `None` once the failing
    /// resource refreshes successfully.
    pub fn failures(&self) -> watch::Receiver<Option<RefreshFailure>> {
        self.failures.subscribe()
    }

    pub fn last_failure(&self) -> Option<RefreshFailure> {
        self.failures.borrow().clone()
    }

    fn withdraw(&self, resource: &Resource, seq: u64) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(resource) {
            slot.in_flight.retain(|(s, _)| *s != seq);
            if slot.in_flight.is_empty() {
                slot.state.send_replace(slot.resting_state());
            }
            debug!(%resource, seq, "refresh withdrawn");
        }
    }
}
