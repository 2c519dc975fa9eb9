//! Integration tests for the `netdash` CLI binary.
//!
//! Argument parsing, config handling, and end-to-end runs against a
//! wiremock backend. Tests never touch the user's real configuration.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netdash` binary with env isolation.
///
/// Clears all `NETDASH_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn netdash_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netdash");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("NETDASH_PROFILE")
        .env_remove("NETDASH_BACKEND")
        .env_remove("NETDASH_CONVENTION")
        .env_remove("NETDASH_OUTPUT")
        .env_remove("NETDASH_INSECURE")
        .env_remove("NETDASH_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A snake_case backend with trailing-slash routes.
async fn snake_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "hostname": "core-sw1", "ip_address": "10.0.0.1", "status": "up",
              "device_type": "switch", "site_id": 1 },
            { "id": 2, "hostname": "edge-rtr", "ip_address": "10.0.0.2", "status": "DOWN",
              "device_type": "router", "site_id": 1 },
            { "id": 3, "hostname": "lab-ap", "ip_address": "10.0.9.3", "status": "unknown",
              "site_id": 2 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "site_name": "HQ", "location": "Berlin" },
            { "id": 2, "site_name": "Lab" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alerts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "device_id": 2, "severity": "critical", "message": "link down" },
            { "id": 8, "device_id": 3, "severity": "warning", "message": "high cpu" }
        ])))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = netdash_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("sites"))
            .and(predicate::str::contains("topology"))
            .and(predicate::str::contains("summary")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netdash"));
}

#[test]
fn test_unknown_status_filter_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home)
        .args(["devices", "--filter", "sideways"])
        .assert()
        .code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_missing_backend_explains_setup() {
    let home = TempDir::new().unwrap();
    let output = netdash_cmd(&home).arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No backend configured"), "got:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = TempDir::new().unwrap();
    let output = netdash_cmd(&home)
        .args(["--profile", "ghost", "devices"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("ghost"));
}

#[test]
fn test_config_path_is_under_config_home() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_add_profile_then_show() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home)
        .args([
            "config",
            "add-profile",
            "lab",
            "--url",
            "http://10.0.0.5:8000/api",
            "--convention",
            "camel",
            "--default",
        ])
        .assert()
        .success();

    netdash_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_profile = \"lab\"")
                .and(predicate::str::contains("[profiles.lab]"))
                .and(predicate::str::contains("convention = \"camel\"")),
        );
}

#[test]
fn test_add_profile_rejects_bad_convention() {
    let home = TempDir::new().unwrap();
    netdash_cmd(&home)
        .args(["config", "add-profile", "x", "--url", "http://x", "--convention", "kebab"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("convention"));
}

// ── End-to-end against a backend ────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_are_canonical_json() {
    let server = snake_backend().await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices = stdout_json(&output);
    assert_eq!(devices.as_array().unwrap().len(), 3);
    assert_eq!(devices[0]["ipAddress"], "10.0.0.1");
    assert_eq!(devices[1]["status"], "offline");
    assert_eq!(devices[2]["status"], "warning");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_device_filter_and_search() {
    let server = snake_backend().await;
    let home = TempDir::new().unwrap();

    netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "--filter", "offline", "-o", "plain"])
        .assert()
        .success()
        .stdout("2\n");

    netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "--search", "10.0.9", "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_summary_counts() {
    let server = snake_backend().await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "summary", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let summary = stdout_json(&output);
    assert_eq!(summary["health"]["total"], 3);
    assert_eq!(summary["health"]["onlinePercent"], 33);
    assert_eq!(summary["alerts"]["active"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_site_groups_devices_by_type() {
    let server = snake_backend().await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "site", "1", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let view = stdout_json(&output);
    assert_eq!(view["site"]["siteName"], "HQ");
    let groups = view["devicesByType"].as_object().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["switch"][0]["hostname"], "core-sw1");
    assert_eq!(groups["router"][0]["hostname"], "edge-rtr");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_camel_backend_interfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/4/interfaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "interfaceName": "GigabitEthernet1/0/1", "status": "up", "speedBps": 1_000_000_000u64 },
            { "id": 2, "interfaceName": "Vlan10", "status": "down" },
            { "id": 3, "interfaceName": "Null0", "status": "up" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "--convention", "camel", "interfaces", "4", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["physical"]["total"], 2);
    assert_eq!(report["summary"]["vlan"]["down"], 1);
    assert_eq!(report["interfaces"].as_array().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_record_fails_with_data_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "hostname": "no-ip" }
        ])))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_unknown_device_is_not_found() {
    let server = snake_backend().await;
    let home = TempDir::new().unwrap();

    netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "delete", "99"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_error_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "sites"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("maintenance"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_device_get_includes_latest_stats() {
    let server = snake_backend().await;
    Mock::given(method("GET"))
        .and(path("/devices/1/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "cpu_percent": 90.0, "memory_percent": 20.0 },
            { "cpu_percent": 12.0, "memory_percent": 48.5, "running_time_seconds": 90_000 }
        ])))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "get", "1", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let device = stdout_json(&output);
    assert_eq!(device["hostname"], "core-sw1");
    assert_eq!(device["stats"]["memoryPercent"], 48.5);
    assert_eq!(device["stats"]["runningTimeSeconds"], 90_000);

    netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("48.5%").and(predicate::str::contains("25h")));

    // No stats endpoint for this device: shown without them.
    let output = netdash_cmd(&home)
        .args(["--backend", &server.uri(), "devices", "get", "2", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let device = stdout_json(&output);
    assert_eq!(device["hostname"], "edge-rtr");
    assert!(device.get("stats").is_none());
}
