// ── Device list filtering ──
//
// Applied to a snapshot; never re-queries the backend.

use std::collections::HashSet;

use crate::model::{Device, EntityId, Health, MacChangeLog};

/// Status facet of the device list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::VariantNames,
)]
#[strum(serialize_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
    Warning,
    /// Devices with at least one recorded MAC address change.
    MacChange,
}

/// Free-text search plus a status facet.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub status: StatusFilter,
    search: Option<String>,
    mac_changed: HashSet<EntityId>,
}

impl DeviceFilter {
    pub fn new(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Case-insensitive match against hostname, IP address, or device
    /// type. Blank text matches everything.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into().trim().to_lowercase();
        self.search = (!text.is_empty()).then_some(text);
        self
    }

    /// Supply the MAC change log used by [`StatusFilter::MacChange`].
    pub fn with_mac_changes<'a>(mut self, logs: impl IntoIterator<Item = &'a MacChangeLog>) -> Self {
        self.mac_changed = logs.into_iter().map(|l| l.device_id.clone()).collect();
        self
    }

    pub fn matches(&self, device: &Device) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Online => device.status == Health::Online,
            StatusFilter::Offline => device.status == Health::Offline,
            StatusFilter::Warning => device.status == Health::Warning,
            StatusFilter::MacChange => self.mac_changed.contains(&device.id),
        };
        status_ok && self.search.as_deref().is_none_or(|needle| text_matches(device, needle))
    }

    /// Filter a collection, keeping input order.
    pub fn apply<'a, D>(&self, devices: impl IntoIterator<Item = &'a D>) -> Vec<&'a D>
    where
        D: AsRef<Device> + 'a + ?Sized,
    {
        devices
            .into_iter()
            .filter(|d| self.matches(d.as_ref()))
            .collect()
    }
}

fn text_matches(device: &Device, needle: &str) -> bool {
    device.hostname.to_lowercase().contains(needle)
        || device.ip_address.to_lowercase().contains(needle)
        || device
            .device_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(needle))
}
