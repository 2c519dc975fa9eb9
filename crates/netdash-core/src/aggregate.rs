// ── Derived statistics ──
//
// Pure functions over snapshots of the canonical collections. They are
// recomputed on every call; nothing here is cached. Output order always
// follows input order.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::classify::{InterfaceCategory, classify};
use crate::model::{Alert, AlertSeverity, Device, EntityId, Health, MacChangeLog, NetworkInterface, Site};

const UNKNOWN_TYPE: &str = "Unknown";

// ── Devices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHealthCounts {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub warning: usize,
    /// Devices whose status is outside the canonical vocabulary.
    pub other: usize,
    /// `online / total` as a whole percentage, rounded half up. 0 when empty.
    pub online_percent: u8,
}

pub fn device_health<'a>(devices: impl IntoIterator<Item = &'a Device>) -> DeviceHealthCounts {
    let mut counts = DeviceHealthCounts::default();
    for device in devices {
        counts.total += 1;
        match device.status {
            Health::Online => counts.online += 1,
            Health::Offline => counts.offline += 1,
            Health::Warning => counts.warning += 1,
            Health::Other(_) => counts.other += 1,
        }
    }
    counts.online_percent = percent(counts.online, counts.total);
    counts
}

/// Integer `round(part / whole * 100)`, half rounding up.
fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCounts {
    pub critical: usize,
    pub warning: usize,
    pub other: usize,
    /// `critical + warning`.
    pub active: usize,
}

pub fn alert_counts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> AlertCounts {
    let mut counts = AlertCounts::default();
    for alert in alerts {
        match alert.severity {
            AlertSeverity::Critical => counts.critical += 1,
            AlertSeverity::Warning => counts.warning += 1,
            AlertSeverity::Other(_) => counts.other += 1,
        }
    }
    counts.active = counts.critical + counts.warning;
    counts
}

// ── Interfaces ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCounts {
    pub total: usize,
    pub up: usize,
    pub down: usize,
}

impl GroupCounts {
    fn record(&mut self, status: &Health) {
        self.total += 1;
        match status {
            Health::Online => self.up += 1,
            Health::Offline => self.down += 1,
            Health::Warning | Health::Other(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceSummary {
    /// All physical interfaces.
    pub physical: GroupCounts,
    pub vlan: GroupCounts,
    pub stack: GroupCounts,
    /// Physical interfaces that are neither VLANs nor stack ports.
    pub regular: GroupCounts,
    /// `down / physical.total`, 0.0 when there are no physical interfaces.
    pub error_rate: f64,
}

/// Physical interfaces split into the three display groups.
#[derive(Debug, Default)]
pub struct InterfaceGroups<'a> {
    pub vlan: Vec<&'a NetworkInterface>,
    pub stack: Vec<&'a NetworkInterface>,
    pub regular: Vec<&'a NetworkInterface>,
}

/// Drop non-physical interfaces and split the rest by category.
pub fn partition_interfaces<'a>(
    interfaces: impl IntoIterator<Item = &'a NetworkInterface>,
) -> InterfaceGroups<'a> {
    let mut groups = InterfaceGroups::default();
    for iface in interfaces {
        let class = classify(iface.name());
        if !class.is_physical {
            continue;
        }
        match class.category {
            InterfaceCategory::Vlan => groups.vlan.push(iface),
            InterfaceCategory::Stack => groups.stack.push(iface),
            InterfaceCategory::Ethernet
            | InterfaceCategory::PortChannel
            | InterfaceCategory::Other => groups.regular.push(iface),
        }
    }
    groups
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn interface_summary<'a>(
    interfaces: impl IntoIterator<Item = &'a NetworkInterface>,
) -> InterfaceSummary {
    let groups = partition_interfaces(interfaces);
    let mut summary = InterfaceSummary::default();

    for (bucket, members) in [
        (&mut summary.vlan, &groups.vlan),
        (&mut summary.stack, &groups.stack),
        (&mut summary.regular, &groups.regular),
    ] {
        for iface in members {
            bucket.record(&iface.status);
            summary.physical.record(&iface.status);
        }
    }

    if summary.physical.total > 0 {
        summary.error_rate = summary.physical.down as f64 / summary.physical.total as f64;
    }
    summary
}

// ── Sites ───────────────────────────────────────────────────────────

pub fn site_device_count<'a>(
    devices: impl IntoIterator<Item = &'a Device>,
    site_id: &EntityId,
) -> usize {
    devices.into_iter().filter(|d| d.belongs_to(site_id)).count()
}

/// Device count per site, in site order. Devices without a site, or with
/// a site that is not listed, are not counted anywhere.
pub fn site_device_counts<'a>(
    sites: impl IntoIterator<Item = &'a Site>,
    devices: impl IntoIterator<Item = &'a Device>,
) -> Vec<(EntityId, usize)> {
    let mut counts: IndexMap<&EntityId, usize> = sites.into_iter().map(|s| (&s.id, 0)).collect();
    for device in devices {
        if let Some(count) = device.site_id.as_ref().and_then(|id| counts.get_mut(id)) {
            *count += 1;
        }
    }
    counts.into_iter().map(|(id, n)| (id.clone(), n)).collect()
}

/// Devices grouped by `deviceType`, groups in first-seen order. Devices
/// without a type land in `"Unknown"`.
pub fn devices_by_type<'a>(
    devices: impl IntoIterator<Item = &'a Device>,
) -> IndexMap<String, Vec<&'a Device>> {
    let mut groups: IndexMap<String, Vec<&'a Device>> = IndexMap::new();
    for device in devices {
        let key = device
            .device_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TYPE);
        groups.entry(key.to_owned()).or_default().push(device);
    }
    groups
}

// ── MAC changes ─────────────────────────────────────────────────────

/// Devices with at least one recorded MAC change, in device order.
pub fn mac_change_devices<'a>(
    devices: impl IntoIterator<Item = &'a Device>,
    logs: impl IntoIterator<Item = &'a MacChangeLog>,
) -> Vec<&'a Device> {
    let changed: HashSet<&EntityId> = logs.into_iter().map(|log| &log.device_id).collect();
    devices
        .into_iter()
        .filter(|d| changed.contains(&d.id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn device(id: i64, status: &str, site: Option<i64>, kind: Option<&str>) -> Device {
        serde_json::from_value(json!({
            "id": id,
            "hostname": format!("dev-{id}"),
            "ipAddress": format!("10.0.0.{id}"),
            "status": status,
            "siteId": site,
            "deviceType": kind,
        }))
        .unwrap()
    }

    fn iface(name: &str, status: &str) -> NetworkInterface {
        serde_json::from_value(json!({ "id": 1, "interfaceName": name, "status": status }))
            .unwrap()
    }

    fn alert(severity: &str) -> Alert {
        serde_json::from_value(json!({ "id": 1, "severity": severity, "message": "x" })).unwrap()
    }

    #[test]
    fn seventy_percent_online() {
        let mut devices: Vec<Device> = (0..7).map(|i| device(i, "up", None, None)).collect();
        devices.extend((7..9).map(|i| device(i, "down", None, None)));
        devices.push(device(9, "unknown", None, None));

        let counts = device_health(&devices);

        assert_eq!(
            counts,
            DeviceHealthCounts {
                total: 10,
                online: 7,
                offline: 2,
                warning: 1,
                other: 0,
                online_percent: 70,
            }
        );
    }

    #[test]
    fn empty_fleet_is_zero_percent() {
        assert_eq!(device_health(&[]), DeviceHealthCounts::default());
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(1, 201), 0);
    }

    #[test]
    fn unrecognized_status_counts_as_other() {
        let devices = [device(1, "flapping", None, None), device(2, "up", None, None)];
        let counts = device_health(&devices);
        assert_eq!((counts.online, counts.offline, counts.warning, counts.other), (1, 0, 0, 1));
        assert_eq!(counts.online_percent, 50);
    }

    #[test]
    fn active_alerts_are_critical_plus_warning() {
        let alerts = [alert("critical"), alert("warning"), alert("warning"), alert("info")];
        assert_eq!(
            alert_counts(&alerts),
            AlertCounts {
                critical: 1,
                warning: 2,
                other: 1,
                active: 3
            }
        );
    }

    #[test]
    fn interface_summary_partitions_physical_ports() {
        let interfaces = [
            iface("GigabitEthernet1/0/1", "up"),
            iface("GigabitEthernet1/0/2", "down"),
            iface("Vlan10", "up"),
            iface("StackPort1", "up"),
            iface("Loopback0", "down"),
            iface("AppGigabitEthernet1/0/1", "down"),
            iface("Port-channel1", "unknown"),
        ];

        let summary = interface_summary(&interfaces);

        assert_eq!(summary.physical, GroupCounts { total: 5, up: 3, down: 1 });
        assert_eq!(summary.vlan, GroupCounts { total: 1, up: 1, down: 0 });
        assert_eq!(summary.stack, GroupCounts { total: 1, up: 1, down: 0 });
        assert_eq!(summary.regular, GroupCounts { total: 3, up: 1, down: 1 });
        assert!((summary.error_rate - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn no_physical_interfaces_means_zero_error_rate() {
        let interfaces = [iface("Loopback0", "down"), iface("Null0", "down")];
        let summary = interface_summary(&interfaces);
        assert_eq!(summary.physical.total, 0);
        assert!(summary.error_rate.abs() < f64::EPSILON);
        assert_eq!(interface_summary(&[]).physical.total, 0);
    }

    #[test]
    fn site_counts_follow_site_order() {
        let sites: Vec<Site> = serde_json::from_value(json!([
            { "id": 2, "siteName": "Branch" },
            { "id": 1, "siteName": "HQ" },
            { "id": 3, "siteName": "Lab" }
        ]))
        .unwrap();
        let devices = [
            device(1, "up", Some(1), None),
            device(2, "up", Some(1), None),
            device(3, "up", Some(2), None),
            device(4, "up", None, None),
            device(5, "up", Some(42), None),
        ];

        assert_eq!(site_device_count(&devices, &EntityId::Numeric(1)), 2);
        assert_eq!(
            site_device_counts(&sites, &devices),
            vec![
                (EntityId::Numeric(2), 1),
                (EntityId::Numeric(1), 2),
                (EntityId::Numeric(3), 0),
            ]
        );
    }

    #[test]
    fn groups_by_type_in_first_seen_order() {
        let devices = [
            device(1, "up", None, Some("switch")),
            device(2, "up", None, None),
            device(3, "up", None, Some("router")),
            device(4, "up", None, Some("switch")),
        ];

        let groups = devices_by_type(&devices);

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, ["switch", "Unknown", "router"]);
        assert_eq!(groups["switch"].len(), 2);
    }

    #[test]
    fn mac_changes_keep_device_order() {
        let devices = [
            device(1, "up", None, None),
            device(2, "up", None, None),
            device(3, "up", None, None),
        ];
        let logs: Vec<MacChangeLog> = serde_json::from_value(json!([
            { "deviceId": 3, "newMac": "AA-BB-CC-DD-EE-FF" },
            { "deviceId": 1 },
            { "deviceId": 3 },
            { "deviceId": 77 }
        ]))
        .unwrap();

        let changed: Vec<i64> = mac_change_devices(&devices, &logs)
            .iter()
            .filter_map(|d| d.id.as_numeric())
            .collect();
        assert_eq!(changed, [1, 3]);
    }
}
