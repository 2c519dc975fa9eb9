//! Inventory normalization and caching layer between `netdash-api` and
//! dashboard consumers (the `netdash` CLI, or any other front end).
//!
//! Two independently-evolved REST services sit behind the dashboard, each
//! with its own field casing and status vocabulary. This crate turns both
//! into one canonical schema:
//!
//! - **Normalization** ([`normalize`]): [`normalize_keys`] rewrites every
//!   field name to camelCase; [`normalize_status`] collapses backend status
//!   words into [`Health`].
//!
//! - **[`classify`]**: decides from a raw interface name whether it is a
//!   physical port and which [`InterfaceCategory`] it belongs to, driven by
//!   explicit pattern tables.
//!
//! - **[`aggregate`]**: pure functions over snapshots (device health,
//!   alert counts, interface summaries, per-site counts).
//!
//! - **[`InventoryStore`]**: the owning cache. Per-resource refresh state
//!   machine with last-request-wins sequencing, stale-while-revalidate
//!   background refreshes, and optimistic mutations with rollback.
//!
//! - **[`Inventory`]**: the facade wiring a [`netdash_api::Backend`] to the
//!   store, including periodic background refresh.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod inventory;
pub mod model;
pub mod normalize;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Classification, InterfaceCategory, Vocabulary, classify, short_identifier};
pub use config::InventoryConfig;
pub use error::CoreError;
pub use inventory::{DeviceAggregates, Inventory, PeriodicRefresh};
pub use normalize::{normalize_keys, normalize_status};
pub use store::{
    InventoryStore, MutationHandle, MutationOp, RefreshFailure, RefreshMode, RefreshOutcome,
    RefreshPayload, RefreshState, Resource, Snapshot,
};
pub use stream::{DeviceFilter, EntityStream, StatusFilter};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertSeverity, Device, DeviceStats, Entity, EntityId, EntityKind, Health, MacAddress,
    MacChangeLog, NetworkInterface, Site, Topology, TopologyEdge, TopologyLink, TopologyNode,
};
