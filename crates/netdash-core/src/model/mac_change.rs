// ── MAC change log ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::{EntityId, MacAddress};

/// A detected MAC address change on a device. Supplied by the caller;
/// the store does not fetch these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacChangeLog {
    pub device_id: EntityId,
    #[serde(default)]
    pub old_mac: Option<MacAddress>,
    #[serde(default)]
    pub new_mac: Option<MacAddress>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub detected_at: Option<DateTime<Utc>>,
}
