// ── Backend body to domain type conversions ──
//
// Bridges decoded JSON bodies from `netdash_api` into canonical
// `netdash_core::model` types. Every body goes through the key normalizer
// first; status fields are normalized by the types' own deserializers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::model::{Alert, Device, DeviceStats, Entity, NetworkInterface, Site, TopologyLink};
use crate::normalize::normalize_keys;
use crate::store::{RefreshPayload, Resource};

/// Decode a collection body into canonical entities.
///
/// The body must be a JSON array; an empty collection is `[]`, never an
/// empty body. An element that fails to decode fails the whole fetch; the
/// existing cache is never touched by a bad body.
pub fn decode_list<T: DeserializeOwned>(resource: &str, body: Value) -> Result<Vec<T>, CoreError> {
    let items = match normalize_keys(body) {
        Value::Array(items) => items,
        other => {
            return Err(CoreError::Decode {
                resource: resource.to_owned(),
                message: format!("expected an array, got {}", describe(&other)),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| CoreError::Decode {
                resource: resource.to_owned(),
                message: format!("item {index}: {e}"),
            })
        })
        .collect()
}

/// Decode and validate a collection of store-owned entities. Invalid
/// records are reported, never dropped.
pub fn decode_entities<T: Entity>(resource: &str, body: Value) -> Result<Vec<T>, CoreError> {
    let entities: Vec<T> = decode_list(resource, body)?;
    for entity in &entities {
        entity.validate()?;
    }
    Ok(entities)
}

/// Decode a single-object body.
pub fn decode_one<T: DeserializeOwned>(resource: &str, body: Value) -> Result<T, CoreError> {
    match normalize_keys(body) {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(|e| CoreError::Decode {
            resource: resource.to_owned(),
            message: e.to_string(),
        }),
        other => Err(CoreError::Decode {
            resource: resource.to_owned(),
            message: format!("expected an object, got {}", describe(&other)),
        }),
    }
}

/// Decode a stats body: either one sample or a list of samples, oldest
/// first. `None` when the backend has no sample yet.
pub fn decode_device_stats(resource: &str, body: Value) -> Result<Option<DeviceStats>, CoreError> {
    match body {
        Value::Array(mut samples) => samples
            .pop()
            .map(|latest| decode_one(resource, latest))
            .transpose(),
        other => decode_one(resource, other).map(Some),
    }
}

/// Decode the body fetched for `resource` into a refresh payload.
pub fn decode_payload(resource: &Resource, body: Value) -> Result<RefreshPayload, CoreError> {
    let name = resource.to_string();
    Ok(match resource {
        Resource::Devices => RefreshPayload::Devices(decode_entities::<Device>(&name, body)?),
        Resource::Sites => RefreshPayload::Sites(decode_entities::<Site>(&name, body)?),
        Resource::Alerts => RefreshPayload::Alerts(decode_entities::<Alert>(&name, body)?),
        Resource::Interfaces(device_id) => RefreshPayload::Interfaces(
            device_id.clone(),
            decode_list::<NetworkInterface>(&name, body)?,
        ),
    })
}

pub fn decode_links(body: Value) -> Result<Vec<TopologyLink>, CoreError> {
    decode_list("topology links", body)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "an object",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Array(_) => "an array",
        Value::Null => "an empty body",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{EntityId, Health};

    #[test]
    fn snake_and_camel_bodies_decode_identically() {
        let snake = json!([{ "id": 1, "hostname": "sw1", "ip_address": "10.0.0.1", "status": "up", "site_id": 2 }]);
        let camel = json!([{ "id": "1", "hostname": "sw1", "ipAddress": "10.0.0.1", "status": "online", "siteId": "2" }]);

        let a: Vec<Device> = decode_entities("devices", snake).unwrap();
        let b: Vec<Device> = decode_entities("devices", camel).unwrap();

        assert_eq!(a, b);
        assert_eq!(a[0].status, Health::Online);
        assert_eq!(a[0].site_id, Some(EntityId::Numeric(2)));
    }

    #[test]
    fn non_array_body_is_a_decode_error() {
        let err = decode_list::<Site>("sites", json!({ "detail": "nope" })).unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref message, .. } if message.contains("object")));
    }

    #[test]
    fn null_body_is_a_decode_error() {
        let err = decode_list::<Device>("devices", Value::Null).unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref message, .. } if message.contains("empty body")));
        assert!(decode_list::<Device>("devices", json!([])).unwrap().is_empty());
    }

    #[test]
    fn stats_accept_one_sample_or_a_series() {
        let one = decode_device_stats("stats", json!({ "cpu_percent": 12.5, "uptime": "1d" })).unwrap();
        assert_eq!(one.unwrap().cpu_percent, Some(12.5));

        let series = json!([
            { "cpu_percent": 40.0, "memory_percent": 10.0 },
            { "cpu_percent": 55.0, "memory_percent": 12.0, "running_time_seconds": 7200 }
        ]);
        let latest = decode_device_stats("stats", series).unwrap().unwrap();
        assert_eq!(latest.cpu_percent, Some(55.0));
        assert_eq!(latest.uptime_label().as_deref(), Some("2h"));

        assert_eq!(decode_device_stats("stats", json!([])).unwrap(), None);
    }

    #[test]
    fn stats_reject_scalars() {
        let err = decode_device_stats("stats", json!("n/a")).unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref message, .. } if message.contains("string")));
    }

    #[test]
    fn one_bad_record_fails_the_fetch() {
        let body = json!([
            { "id": 1, "ipAddress": "10.0.0.1" },
            { "id": 2, "hostname": "no-address" }
        ]);
        let err = decode_entities::<Device>("devices", body).unwrap_err();
        assert!(matches!(err, CoreError::Decode { ref message, .. } if message.starts_with("item 1")));
    }

    #[test]
    fn invalid_records_surface_as_validation_errors() {
        let body = json!([{ "id": 1, "site_name": "A" }]);
        let err = decode_entities::<Site>("sites", body).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn interface_payload_carries_owner() {
        let resource = Resource::Interfaces(EntityId::Numeric(4));
        let payload = decode_payload(
            &resource,
            json!([{ "id": 1, "device_id": 4, "interface_name": "Vlan1", "crc_errors": 3 }]),
        )
        .unwrap();

        match payload {
            RefreshPayload::Interfaces(owner, list) => {
                assert_eq!(owner, EntityId::Numeric(4));
                assert_eq!(list[0].crc_errors, Some(3));
            }
            _ => panic!("expected interfaces payload"),
        }
    }
}
