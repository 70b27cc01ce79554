//! Integration tests for the `ghwatch` binary.
//!
//! Argument parsing, config errors, and `--snapshot` output against a
//! wiremock backend. The terminal UI itself is never entered.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ghwatch` binary with env isolation.
///
/// Clears `GHWATCH_*` env vars and points config and log paths at a
/// throwaway directory so tests never touch the user's real files.
fn ghwatch_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ghwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("GHWATCH_URL")
        .env_remove("GHWATCH_PROFILE")
        .env_remove("RUST_LOG")
        .arg("--log-file")
        .arg(home.join("ghwatch.log"));
    cmd
}

fn scratch() -> std::path::PathBuf {
    scratch_named("shared")
}

/// A home directory of its own, for tests that write a config file.
fn scratch_named(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ghwatch-cli-test-{}-{name}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

async fn mount(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_lists_flags() {
    ghwatch_cmd(&scratch()).arg("--help").assert().success().stdout(
        predicate::str::contains("--url")
            .and(predicate::str::contains("--refresh"))
            .and(predicate::str::contains("--snapshot")),
    );
}

#[test]
fn test_missing_url_is_an_error() {
    ghwatch_cmd(&scratch())
        .arg("--snapshot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no backend URL"));
}

#[test]
fn test_refresh_outside_allow_list_is_rejected() {
    ghwatch_cmd(&scratch())
        .args(["--snapshot", "--url", "http://127.0.0.1:9", "--refresh", "1500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refresh_ms"));
}

#[test]
fn test_unknown_profile_is_rejected() {
    ghwatch_cmd(&scratch())
        .args(["--snapshot", "--profile", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile 'nope'"));
}

// ── Profiles ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_saved_profile_becomes_default() {
    let server = MockServer::start().await;
    mount(&server, "/status", json!({"status": "ok"})).await;
    mount(&server, "/schema/getters", json!({})).await;
    mount(&server, "/schema/executors", json!({})).await;
    mount(&server, "/getters", json!({"temp": {"valid": true}})).await;
    mount(&server, "/executors", json!([])).await;

    let home = scratch_named("save-profile");
    let _ = std::fs::remove_dir_all(home.join(".config"));
    let uri = server.uri();

    let (saved, snapshot) = tokio::task::spawn_blocking(move || {
        let saved = ghwatch_cmd(&home)
            .args(["--url", &uri, "--refresh", "5000", "--save-profile", "lab"])
            .output()
            .unwrap();
        // No --url: the saved default profile supplies it.
        let snapshot = ghwatch_cmd(&home).arg("--snapshot").output().unwrap();
        (saved, snapshot)
    })
    .await
    .unwrap();

    assert!(saved.status.success());
    assert!(String::from_utf8_lossy(&saved.stdout).contains("Saved profile 'lab'"));
    assert!(snapshot.status.success());
    assert!(String::from_utf8_lossy(&snapshot.stdout).contains("temp"));

    let written = std::fs::read_to_string(
        scratch_named("save-profile")
            .join(".config")
            .join("ghwatch")
            .join("config.toml"),
    )
    .unwrap();
    assert!(written.contains(r#"default_profile = "lab""#));
    assert!(written.contains("[profiles.lab]"));
    assert!(written.contains("refresh_ms = 5000"));
}

#[test]
fn test_save_profile_validates_before_writing() {
    let home = scratch_named("save-invalid");
    let _ = std::fs::remove_dir_all(home.join(".config"));

    ghwatch_cmd(&home)
        .args(["--url", "http://10.0.0.5:8080", "--refresh", "1234", "--save-profile", "lab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refresh_ms"));

    assert!(!home.join(".config").join("ghwatch").join("config.toml").exists());
}

// ── Snapshot mode ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_prints_escaped_markup() {
    let server = MockServer::start().await;
    mount(&server, "/status", json!({"status": "ok"})).await;
    mount(&server, "/schema/getters", json!({"temp": "float"})).await;
    mount(&server, "/schema/executors", json!({})).await;
    mount(
        &server,
        "/getters",
        json!({
            "temp": {"valid": true, "stampMs": 12, "data": {"type": "float", "value": 21.5}},
            "<b>": {"valid": false}
        }),
    )
    .await;
    mount(&server, "/executors", json!([])).await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        ghwatch_cmd(&scratch())
            .args(["--snapshot", "--url", &uri])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("type:float"));
    assert!(stdout.contains("float:21.5"));
    assert!(stdout.contains("&lt;b&gt;"));
    assert!(!stdout.contains("<b>"));
    assert!(stdout.contains("No data"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_of_failed_cycle_exits_non_zero() {
    let server = MockServer::start().await;
    // Nothing mounted: every endpoint answers 404.
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        ghwatch_cmd(&scratch())
            .args(["--snapshot", "--url", &uri, "--language", "ru"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"<div class="small bad">Ошибка загрузки: "#));
    assert!(stdout.contains("-&gt; 404"));
}
