// ── Canonical health vocabulary ──

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_status;

/// The only health vocabulary consumers ever see.
///
/// Backends report `up`/`down`/`unknown`, `online`/`offline`, or their own
/// words. Everything funnels through [`normalize_status`]; values it does
/// not recognize survive as `Other` (lower-cased) for display and fall
/// outside every canonical count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Health {
    Online,
    #[default]
    Offline,
    Warning,
    Other(String),
}

impl Health {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Warning => "warning",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }

    /// `true` for the three canonical values.
    pub fn is_standard(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Health {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Deserialization runs the status normalizer, so a decoded entity can
/// never carry a raw backend status string.
impl<'de> Deserialize<'de> for Health {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(normalize_status(raw.as_deref()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_raw_backend_values() {
        let up: Health = serde_json::from_value(json!("UP")).unwrap();
        let null: Health = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(up, Health::Online);
        assert_eq!(null, Health::Offline);
    }

    #[test]
    fn serializes_as_lowercase_word() {
        assert_eq!(serde_json::to_value(Health::Warning).unwrap(), json!("warning"));
        assert_eq!(
            serde_json::to_value(Health::Other("flapping".into())).unwrap(),
            json!("flapping")
        );
    }

    #[test]
    fn canonical_output_round_trips() {
        let h: Health = serde_json::from_value(json!("online")).unwrap();
        assert!(h.is_online());
        assert!(h.is_standard());
    }
}
