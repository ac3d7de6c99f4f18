//! Integration tests for the `petal` CLI binary.
//!
//! Argument parsing, help output, completions, and a few end-to-end runs
//! against a wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `petal` binary with env isolation.
///
/// Clears all `PETAL_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn petal_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("petal");
    cmd.env("HOME", "/tmp/petal-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/petal-cli-test-nonexistent")
        .env("PETAL_READ_RETRIES", "0")
        .env("NO_COLOR", "1")
        .env_remove("PETAL_BASE_URL")
        .env_remove("PETAL_ACCESS_TOKEN")
        .env_remove("PETAL_CITY_ID")
        .env_remove("PETAL_OUTPUT")
        .env_remove("PETAL_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || petal_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut all = vec!["--base-url".to_owned(), server.uri()];
    all.extend(rest.iter().map(|s| (*s).to_owned()));
    all
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = petal_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected 'Usage' in:\n{stderr}");
}

#[test]
fn test_help_lists_commands() {
    petal_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("customers")
            .and(predicate::str::contains("products"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_completions_bash() {
    petal_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("petal"));
}

#[test]
fn test_invalid_output_format_is_rejected() {
    petal_cmd()
        .args(["--output", "xml", "customers", "list"])
        .assert()
        .failure()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_data_command_without_base_url_explains_setup() {
    petal_cmd()
        .args(["customers", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_show_redacts_token() {
    petal_cmd()
        .args([
            "--base-url",
            "https://shop.example.com",
            "--token",
            "super-secret",
            "config",
            "show",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://shop.example.com")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("super-secret").not()),
        );
}

#[test]
fn test_config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = petal_cmd();
    cmd.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
    cmd.args(["config", "init", "--base-url", "https://shop.example.com", "--city", "4"])
        .assert()
        .success();

    let mut show = petal_cmd();
    show.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
    show.args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("city_id = \"4\""));
}

// ── Backend runs ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_customers_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/customers/with-stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "customers": [
                    {"id": 7, "name": "Айгерим", "last_name": "Садыкова", "total_orders": 3, "total_spent": 42000}
                ],
                "pagination": {"total": 1, "page": 1, "limit": 20, "pages": 1}
            }
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "json", "customers", "list"])).await;
    assert!(output.status.success(), "{output:?}");

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["id"], 7);
    assert_eq!(body[0]["name"], "Айгерим Садыкова");
    assert_eq!(body[0]["stats"]["total_orders"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_customer_detail_uses_stored_record_when_backend_is_down() {
    let server = MockServer::start().await;

    let output = run(args(&server, &["-o", "plain", "customers", "get", "469"])).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "469");
    assert!(String::from_utf8_lossy(&output.stderr).contains("stored record"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_customer_exits_not_found() {
    let server = MockServer::start().await;

    let output = run(args(&server, &["customers", "get", "999"])).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_list_falls_back_and_warns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/order/order-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"orders": [
                {"id": "5120", "status_id": "DE", "productName": "Розы", "price_formated": "18 000"},
                {"id": "5121", "status_id": "N"}
            ]}
        })))
        .mount(&server)
        .await;

    let output = run(args(
        &server,
        &["-o", "json", "orders", "list", "--status", "in-transit"],
    ))
    .await;
    assert!(output.status.success(), "{output:?}");

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 5120);
    assert_eq!(body[0]["status"], "in-transit");
    assert!(String::from_utf8_lossy(&output.stderr).contains("old order list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_order_delete_with_yes_skips_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v2/orders/delete"))
        .and(query_param("id", "77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(args(&server, &["--yes", "orders", "delete", "77"])).await;
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Order 77 deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inventory_search_plain_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/inventory/"))
        .and(query_param("search", "роза"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 6, "name": "Роза Эквадор"}, {"id": 9, "name": "Роза кустовая"}]
        })))
        .mount(&server)
        .await;

    let output = run(args(&server, &["-o", "plain", "inventory", "search", "роза"])).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "6\n9");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_price_change_is_a_usage_error() {
    let server = MockServer::start().await;

    let output = run(args(&server, &["products", "set-price", "5"])).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_exits_with_connection_code() {
    let output = run(vec![
        "--base-url".into(),
        "http://127.0.0.1:9".into(),
        "orders".into(),
        "get".into(),
        "1".into(),
    ])
    .await;
    assert_eq!(output.status.code(), Some(7));
}
