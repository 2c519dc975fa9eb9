// ── Device domain type ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::health::Health;
use super::{Entity, EntityKind};
use crate::error::CoreError;

/// A managed network device, in canonical form.
///
/// `ip_address` is mandatory: a body without one fails to decode. `status`
/// is always one of the canonical [`Health`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: EntityId,
    #[serde(default)]
    pub hostname: String,
    pub ip_address: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub status: Health,
    #[serde(default)]
    pub site_id: Option<EntityId>,

    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,

    // Management capabilities
    #[serde(default)]
    pub snmp_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snmp_community: Option<String>,
    #[serde(default)]
    pub ssh_enabled: bool,
    #[serde(default)]
    pub ssh_port: Option<u16>,

    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Display label: hostname, falling back to the IP address.
    pub fn label(&self) -> &str {
        if self.hostname.trim().is_empty() {
            &self.ip_address
        } else {
            &self.hostname
        }
    }

    pub fn has_snmp_community(&self) -> bool {
        self.snmp_community.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn belongs_to(&self, site_id: &EntityId) -> bool {
        self.site_id.as_ref() == Some(site_id)
    }
}

impl Entity for Device {
    const KIND: EntityKind = EntityKind::Device;

    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn validate(&self) -> Result<(), CoreError> {
        let ip = self.ip_address.trim();
        if ip.is_empty() {
            return Err(CoreError::Validation {
                field: "ipAddress".into(),
                reason: "required".into(),
            });
        }
        if ip.parse::<IpAddr>().is_err() && !is_hostname(ip) {
            return Err(CoreError::Validation {
                field: "ipAddress".into(),
                reason: format!("'{ip}' is neither an IP address nor a hostname"),
            });
        }
        Ok(())
    }
}

/// RFC 1123 host name: dot-separated labels of alphanumerics and hyphens.
fn is_hostname(s: &str) -> bool {
    s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
