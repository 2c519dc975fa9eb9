#![allow(clippy::unwrap_used)]
// End-to-end tests: `Inventory::connect` against wiremock backends of
// both conventions.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netdash_api::BackendConvention;
use netdash_core::{
    EntityId, EntityKind, Health, Inventory, InventoryConfig, RefreshMode, Resource,
};

async fn connect(convention: BackendConvention) -> (MockServer, Inventory<netdash_api::HttpBackend>) {
    let server = MockServer::start().await;
    let config = InventoryConfig::new(Url::parse(&server.uri()).unwrap(), convention);
    let inventory = Inventory::connect(config).unwrap();
    (server, inventory)
}

#[tokio::test]
async fn test_both_conventions_produce_the_same_devices() {
    let (snake, snake_inventory) = connect(BackendConvention::SNAKE_SLASHED).await;
    let (camel, camel_inventory) = connect(BackendConvention::CAMEL_BARE).await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "hostname": "core", "ip_address": "10.0.0.1", "status": "up", "site_id": 3 }
        ])))
        .mount(&snake)
        .await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "hostname": "core", "ipAddress": "10.0.0.1", "status": "online", "siteId": 3 }
        ])))
        .mount(&camel)
        .await;

    for inventory in [&snake_inventory, &camel_inventory] {
        inventory
            .refresh(Resource::Devices, RefreshMode::Foreground)
            .await
            .unwrap();
    }

    assert_eq!(snake_inventory.devices(), camel_inventory.devices());
    let device = snake_inventory.device(&EntityId::Numeric(1)).unwrap();
    assert_eq!(device.status, Health::Online);
    assert_eq!(device.site_id, Some(EntityId::Numeric(3)));
}

#[tokio::test]
async fn test_create_is_sent_in_backend_casing() {
    let (server, inventory) = connect(BackendConvention::SNAKE_SLASHED).await;

    Mock::given(method("POST"))
        .and(path("/sites/"))
        .and(body_json(json!({ "site_name": "Branch", "location": "Lyon" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12, "site_name": "Branch", "location": "Lyon"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = inventory
        .create(
            EntityKind::Site,
            json!({ "siteName": "Branch", "location": "Lyon" }),
        )
        .await
        .unwrap();

    assert_eq!(id, EntityId::Numeric(12));
    assert_eq!(inventory.site(&id).unwrap().location.as_deref(), Some("Lyon"));
}

#[tokio::test]
async fn test_device_alerts_and_health_passthrough() {
    let (server, inventory) = connect(BackendConvention::CAMEL_BARE).await;

    Mock::given(method("GET"))
        .and(path("/alerts/device/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "deviceId": 5, "severity": "CRITICAL", "message": "fan failure" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let alerts = inventory.device_alerts(&EntityId::Numeric(5)).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, "fan failure");

    let health = inventory.health_check().await.unwrap();
    assert_eq!(health["status"], "ok");
}
