// ── Status vocabulary normalization ──
//
// Devices and interfaces report health in whatever words their backend
// uses. This is the single place those words become `Health`.

use crate::model::Health;

/// Map a raw backend status to the canonical [`Health`] value.
///
/// Total and pure. Matching is case-insensitive and ignores surrounding
/// whitespace:
///
/// | raw                      | result            |
/// |--------------------------|-------------------|
/// | absent / empty / null    | `Offline`         |
/// | `up`, `online`           | `Online`          |
/// | `down`, `offline`        | `Offline`         |
/// | `unknown`, `warning`     | `Warning`         |
/// | anything else            | `Other(lowered)`  |
pub fn normalize_status(raw: Option<&str>) -> Health {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Health::Offline;
    };

    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "up" | "online" => Health::Online,
        "down" | "offline" => Health::Offline,
        "unknown" | "warning" => Health::Warning,
        _ => Health::Other(lowered),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn totality_table() {
        let cases: [(Option<&str>, Health); 7] = [
            (None, Health::Offline),
            (Some(""), Health::Offline),
            (Some("UP"), Health::Online),
            (Some("Down"), Health::Offline),
            (Some("unknown"), Health::Warning),
            (Some("flapping"), Health::Other("flapping".into())),
            (Some("   "), Health::Offline),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_status(raw), expected, "raw = {raw:?}");
        }
    }

    #[test]
    fn unrecognized_values_are_lowercased() {
        assert_eq!(
            normalize_status(Some("AdminDown")),
            Health::Other("admindown".into())
        );
    }

    #[test]
    fn canonical_values_are_fixed_points() {
        for h in [Health::Online, Health::Offline, Health::Warning] {
            assert_eq!(normalize_status(Some(h.as_str())), h);
        }
    }
}
