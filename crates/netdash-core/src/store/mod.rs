// ── Inventory store ──
//
// The owning cache of canonical entities, with per-resource refresh state
// and optimistic mutation tracking.

mod collection;
mod inventory_store;
mod mutation;
mod refresh;

pub use collection::Snapshot;
pub use inventory_store::{InventoryStore, RefreshPayload};
pub use mutation::{MutationHandle, MutationOp, PROVISIONAL_PREFIX, is_provisional};
pub use refresh::{
    RefreshFailure, RefreshMode, RefreshOutcome, RefreshState, RefreshTicket, RefreshTracker,
    Resource,
};
