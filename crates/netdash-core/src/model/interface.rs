// ── Network interface domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::{EntityId, MacAddress};
use super::health::Health;

/// One interface record reported by a device.
///
/// `interface_name` is the raw name as the device reports it and is the
/// only input to classification. Error counters stay `None` when the
/// backend did not report them; the `*_or_zero` accessors are for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub id: EntityId,
    #[serde(default)]
    pub device_id: Option<EntityId>,
    #[serde(default)]
    pub interface_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Health,
    #[serde(default)]
    pub speed_bps: Option<u64>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub mac_address: Option<MacAddress>,
    #[serde(default)]
    pub input_errors: Option<u64>,
    #[serde(default)]
    pub output_errors: Option<u64>,
    #[serde(default)]
    pub crc_errors: Option<u64>,
}

impl NetworkInterface {
    pub fn name(&self) -> &str {
        self.interface_name.as_deref().unwrap_or("")
    }

    pub fn input_errors_or_zero(&self) -> u64 {
        self.input_errors.unwrap_or(0)
    }

    pub fn output_errors_or_zero(&self) -> u64 {
        self.output_errors.unwrap_or(0)
    }

    pub fn crc_errors_or_zero(&self) -> u64 {
        self.crc_errors.unwrap_or(0)
    }

    /// Link speed in Mbit/s.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn speed_mbps(&self) -> Option<f64> {
        self.speed_bps.map(|bps| bps as f64 / 1_000_000.0)
    }
}
