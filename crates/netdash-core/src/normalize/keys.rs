// ── Field-name normalization ──
//
// Rewrites every object key of a decoded body into the canonical
// camelCase spelling, whichever backend produced it.

use serde_json::{Map, Value};

/// `site_name` → `siteName`.
///
/// A run of underscores followed by an ASCII lowercase letter or digit is
/// removed and the following character upper-cased. Any other underscore
/// run is kept as-is. Keys already in camelCase come back unchanged, and
/// applying the function twice equals applying it once.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '_' {
            out.push(ch);
            continue;
        }

        let mut run = 1;
        while chars.next_if_eq(&'_').is_some() {
            run += 1;
        }
        match chars.next_if(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            Some(next) => out.push(next.to_ascii_uppercase()),
            None => out.extend(std::iter::repeat_n('_', run)),
        }
    }
    out
}

/// Recursively normalize the keys of every object in `value`.
///
/// Arrays keep their order; scalars (including strings that happen to
/// contain JSON) pass through untouched.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn rewrites_snake_case_keys() {
        assert_eq!(normalize_key("ip_address"), "ipAddress");
        assert_eq!(normalize_key("crc_errors"), "crcErrors");
        assert_eq!(normalize_key("wan_1_ip"), "wan1Ip");
    }

    #[test]
    fn leaves_camel_case_alone() {
        assert_eq!(normalize_key("ipAddress"), "ipAddress");
        assert_eq!(normalize_key("id"), "id");
    }

    #[test]
    fn keeps_underscores_not_followed_by_lowercase() {
        assert_eq!(normalize_key("a_B"), "a_B");
        assert_eq!(normalize_key("trailing_"), "trailing_");
        assert_eq!(normalize_key("_Private"), "_Private");
    }

    #[test]
    fn collapses_underscore_runs_in_one_pass() {
        assert_eq!(normalize_key("a__b"), "aB");
        assert_eq!(normalize_key("x__1"), "x1");
        assert_eq!(normalize_key("a___b1"), "aB1");
        assert_eq!(normalize_key("__1"), "1");
        assert_eq!(normalize_key("a__"), "a__");
    }

    #[test]
    fn walks_nested_structures() {
        let raw = json!({
            "site_id": 4,
            "interfaces": [
                { "interface_name": "Vlan10", "speed_bps": 1_000_000 },
                { "interface_name": "Loopback0", "speed_bps": null }
            ],
            "meta": { "last_seen": "2024-06-01T10:00:00" }
        });
        let expected = json!({
            "siteId": 4,
            "interfaces": [
                { "interfaceName": "Vlan10", "speedBps": 1_000_000 },
                { "interfaceName": "Loopback0", "speedBps": null }
            ],
            "meta": { "lastSeen": "2024-06-01T10:00:00" }
        });
        assert_eq!(normalize_keys(raw), expected);
    }

    #[test]
    fn does_not_touch_string_payloads() {
        let raw = json!({ "raw_body": "{\"inner_key\": 1}" });
        let normalized = normalize_keys(raw);
        assert_eq!(normalized["rawBody"], "{\"inner_key\": 1}");
    }

    #[test]
    fn scalars_pass_through() {
        for v in [json!(null), json!(3.5), json!(true), json!("snake_case_value")] {
            assert_eq!(normalize_keys(v.clone()), v);
        }
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            json!({ "a_b": { "c__d": [ { "e_1_f": 1 } ] }, "_x": null }),
            json!([{ "site_name": "HQ" }, { "siteName": "Branch" }]),
            json!({ "___": 1, "x_": 2, "y_Z": 3 }),
            json!({ "x__1": 1, "a___b1": 2, "__1": 3, "m__N_o": 4 }),
        ];
        for sample in samples {
            let once = normalize_keys(sample);
            let twice = normalize_keys(once.clone());
            assert_eq!(once, twice);
        }
    }
}
