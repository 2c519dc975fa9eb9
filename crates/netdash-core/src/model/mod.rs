// ── Canonical domain model ──
//
// Every type here is decoded from a key-normalized (camelCase) JSON body.
// Status-bearing fields go through the status normalizer on the way in, so
// nothing downstream ever sees a backend's own vocabulary.

pub mod alert;
pub mod device;
pub mod entity_id;
pub mod health;
pub mod interface;
pub mod mac_change;
pub mod site;
pub mod stats;
pub mod topology;

pub use alert::{Alert, AlertSeverity};
pub use device::Device;
pub use entity_id::{EntityId, MacAddress};
pub use health::Health;
pub use interface::NetworkInterface;
pub use mac_change::MacChangeLog;
pub use site::Site;
pub use stats::DeviceStats;
pub use topology::{NodeKind, Topology, TopologyEdge, TopologyLink, TopologyNode};

use crate::error::CoreError;

/// Which cached collection an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Device,
    Site,
    Alert,
}

/// Behaviour shared by the store-owned entity types.
pub trait Entity: Clone + Send + Sync + serde::Serialize + serde::de::DeserializeOwned + 'static {
    const KIND: EntityKind;

    fn entity_id(&self) -> &EntityId;

    /// Check the invariants serde alone cannot express.
    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Lenient timestamp decoding.
///
/// One backend emits RFC 3339, the other naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// strings in UTC. Anything unparseable decodes as `None` rather than
/// failing the whole entity.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

}
