// ── Device runtime statistics ──

use serde::{Deserialize, Serialize};

/// Latest resource usage sample for one device. Every field is optional;
/// backends report whatever their poller collected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_percent: Option<f64>,
    /// Uptime as the device formats it (`"12d 4h"`).
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub running_time_seconds: Option<u64>,
}

impl DeviceStats {
    /// The device's own uptime text, else whole hours of running time.
    pub fn uptime_label(&self) -> Option<String> {
        self.uptime
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| self.running_time_seconds.map(|s| format!("{}h", s / 3600)))
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none() && self.memory_percent.is_none() && self.uptime_label().is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn uptime_prefers_device_text() {
        let stats: DeviceStats = serde_json::from_value(json!({
            "uptime": "3d 2h",
            "runningTimeSeconds": 7200
        }))
        .unwrap();
        assert_eq!(stats.uptime_label().as_deref(), Some("3d 2h"));
    }

    #[test]
    fn uptime_falls_back_to_whole_hours() {
        let stats = DeviceStats {
            running_time_seconds: Some(9_000),
            ..DeviceStats::default()
        };
        assert_eq!(stats.uptime_label().as_deref(), Some("2h"));
        assert!(!stats.is_empty());
        assert!(DeviceStats::default().is_empty());
    }
}
