//! Integration tests for the `nimbus` binary.
//!
//! Argument parsing, help output and completions run offline; the console
//! round trips run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `nimbus` binary with env isolation.
///
/// Clears all `NIMBUS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn nimbus_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nimbus");
    cmd.env("HOME", "/tmp/nimbus-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/nimbus-cli-test-nonexistent")
        .env_remove("NIMBUS_PROFILE")
        .env_remove("NIMBUS_URL")
        .env_remove("NIMBUS_ORGANIZATION")
        .env_remove("NIMBUS_SESSION")
        .env_remove("NIMBUS_OUTPUT")
        .env_remove("NIMBUS_INSECURE")
        .env_remove("NIMBUS_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn console_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/csrf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&server)
        .await;
    server
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    tokio::task::spawn_blocking(move || {
        nimbus_cmd()
            .args(["--url", &uri, "--session", "session=abc", "--yes"])
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = nimbus_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    nimbus_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("cloud console")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("subscription")),
    );
}

#[test]
fn test_version_flag() {
    nimbus_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nimbus"));
}

#[test]
fn test_completions_zsh() {
    nimbus_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_kinds_plain() {
    nimbus_cmd()
        .args(["kinds", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("firewall")
                .and(predicate::str::contains("balancer"))
                .and(predicate::str::contains("service")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_unknown_kind() {
    let output = nimbus_cmd().args(["list", "spaceship"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nimbus kinds"));
}

#[test]
fn test_list_without_console_configured() {
    let output = nimbus_cmd().args(["list", "node"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No console configured"), "got:\n{text}");
}

#[test]
fn test_list_without_session() {
    let output = nimbus_cmd()
        .args(["--url", "http://127.0.0.1:9", "list", "node"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No session configured"));
}

#[test]
fn test_config_path() {
    nimbus_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Console round trips ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_renders_ids() {
    let server = console_server().await;
    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firewalls": [
                {"id": "fw-1", "name": "web"},
                {"id": "fw-2", "name": "db"},
            ],
            "count": 2,
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "list", "firewall"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "fw-1\nfw-2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_missing_record() {
    let server = console_server().await;
    Mock::given(method("GET"))
        .and(path("/node/n-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "error_msg": "Node not found",
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["get", "node", "n-404"]).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/csrf"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run_against(&server, &["list", "zone"]).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Session expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejection_uses_alert_wording() {
    let server = console_server().await;
    Mock::given(method("DELETE"))
        .and(path("/firewall/fw-1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "firewall_in_use",
            "error_msg": "Firewall is attached to instances",
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["delete", "firewall", "fw-1"]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(
        combined_output(&output)
            .contains("Failed to delete firewall: Firewall is attached to instances")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_action_sends_ids_and_action() {
    let server = console_server().await;
    Mock::given(method("PUT"))
        .and(path("/instance"))
        .and(body_json(json!({"ids": ["i-1", "i-2"], "action": "stop"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["action", "instance", "stop", "i-1", "i-2"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}
