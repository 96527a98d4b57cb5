use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn agentmem(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("agentmem").unwrap();
    cmd.env("AGENTMEM_DB_PATH", dir.path().join("memory.db"))
        .env("AGENTMEM_EMBEDDING_PROVIDERS", "hash")
        .env("RUST_LOG", "warn");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn observe(dir: &TempDir, title: &str) -> i64 {
    let out = json_output(agentmem(dir).args([
        "observe",
        "--session",
        "s1",
        "--project",
        "acme",
        "--type",
        "bugfix",
        "--title",
        title,
        "--narrative",
        "token refresh raced with logout",
    ]));
    out["id"].as_i64().unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("agentmem").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Persistent memory for AI coding agents"));
}

#[test]
fn test_migrate_reports_schema_version() {
    let dir = TempDir::new().unwrap();
    let out = json_output(agentmem(&dir).arg("migrate"));
    assert_eq!(out["schema_version"], out["latest"]);
}

#[test]
fn test_observe_then_search_and_get() {
    let dir = TempDir::new().unwrap();
    let id = observe(&dir, "Fixed login race");

    let found = json_output(agentmem(&dir).args(["search", "login", "--project", "acme"]));
    let hits = found["observations"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["observation"]["id"].as_i64(), Some(id));

    let fetched = json_output(agentmem(&dir).args(["get", &id.to_string(), "999"]));
    assert_eq!(fetched.as_array().unwrap().len(), 1);
}

#[test]
fn test_observe_embeds_and_hybrid_finds_it() {
    let dir = TempDir::new().unwrap();
    let out = json_output(agentmem(&dir).args([
        "observe",
        "--session",
        "s1",
        "--project",
        "acme",
        "--type",
        "feature",
        "--title",
        "Added rate limiter to upload endpoint",
    ]));
    assert_eq!(out["embedded"], Value::Bool(true));

    let hits = json_output(agentmem(&dir).args(["hybrid", "rate limiter upload", "--project", "acme"]));
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["source"], "hybrid");
}

#[test]
fn test_context_lists_recent_observations() {
    let dir = TempDir::new().unwrap();
    observe(&dir, "First fix");
    observe(&dir, "Second fix");

    let bundle = json_output(agentmem(&dir).args(["context", "acme"]));
    assert!(bundle.to_string().contains("Second fix"));
}

#[test]
fn test_unknown_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    agentmem(&dir)
        .args(["observe", "--session", "s1", "--project", "acme", "--type", "nope", "--title", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_empty_database_stats() {
    let dir = TempDir::new().unwrap();
    let out = json_output(agentmem(&dir).arg("stats"));
    assert!(out.is_object());
}
