// Resource paths shared by every backend.
//
// Paths are described structurally; the trailing-slash policy is applied
// by the backend's `PathStyle` when the URL is built.

use std::fmt;

/// A REST resource exposed by the inventory backends.
///
/// Identifiers are carried as strings: one backend uses integer keys, the
/// other opaque strings, and the path only needs their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    Devices,
    Device(String),
    DeviceInterfaces(String),
    DeviceStats(String),
    Sites,
    Site(String),
    Alerts,
    Alert(String),
    DeviceAlerts(String),
    TopologyLinks,
    Health,
}

impl ResourcePath {
    /// Path segments without any leading or trailing separator.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Devices => vec!["devices"],
            Self::Device(id) => vec!["devices", id],
            Self::DeviceInterfaces(id) => vec!["devices", id, "interfaces"],
            Self::DeviceStats(id) => vec!["devices", id, "stats"],
            Self::Sites => vec!["sites"],
            Self::Site(id) => vec!["sites", id],
            Self::Alerts => vec!["alerts"],
            Self::Alert(id) => vec!["alerts", id],
            Self::DeviceAlerts(id) => vec!["alerts", "device", id],
            Self::TopologyLinks => vec!["topology", "links"],
            Self::Health => vec!["health"],
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}
