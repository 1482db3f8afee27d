use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chores() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chores"));
    cmd.env_remove("CHORES_DRIVE_ACCESS_TOKEN")
        .env_remove("CHORES_DRIVE_API_BASE")
        .env_remove("CHORES_DRIVE_FOLDER_ID")
        .env_remove("CHORES_BLOG_ENDPOINT")
        .env_remove("CHORES_BLOG_OUTPUT_FILE")
        .env_remove("CHORES_REWIRE_FILE")
        .env("CHORES_QUIET", "1");
    cmd
}

#[test]
fn test_help_lists_every_chore() {
    chores()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("rewire"))
        .stdout(predicate::str::contains("blogs"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_rewire_help_shows_overrides() {
    chores()
        .args(["rewire", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--branch"))
        .stdout(predicate::str::contains("--only-prefix"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn test_long_help_lists_environment_overrides() {
    chores()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIGURATION:"))
        .stdout(predicate::str::contains("CHORES_BLOG_ENDPOINT"))
        .stdout(predicate::str::contains("CHORES_DRIVE_ACCESS_TOKEN"));
}

#[test]
fn test_version_flag() {
    chores()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_rewire_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .arg("rewire")
        .assert()
        .failure()
        .stderr(predicate::str::contains("WORKFLOW_FIXED_COMPLETE.json"));
}

#[test]
fn test_rewire_reports_counts() {
    let dir = TempDir::new().unwrap();
    let workflow = dir.path().join("workflow.json");
    fs::write(
        &workflow,
        r#"{
  "connections": {
    "If File Exists": {"main": [[{"node": "Update File", "type": "main", "index": 0}], [{"node": "Get Latest Branch SHA", "type": "main", "index": 0}]]},
    "Get Latest Branch SHA": {"main": [[{"node": "Create New File", "type": "main", "index": 0}]]}
  }
}"#,
    )
    .unwrap();

    chores()
        .current_dir(dir.path())
        .args(["rewire", "workflow.json", "fixed.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleanup complete!"))
        .stdout(predicate::str::contains("Updated 1 connections"))
        .stdout(predicate::str::contains("Removed 1 deprecated node connections"));

    let fixed = fs::read_to_string(dir.path().join("fixed.json")).unwrap();
    assert!(fixed.contains("Create New File"));
    assert!(!fixed.contains("Get Latest Branch SHA"));
}

#[test]
fn test_convert_without_token_fails() {
    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .args(["convert", "some-file-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn test_convert_without_folder_fails() {
    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .env("CHORES_DRIVE_ACCESS_TOKEN", "token")
        .env_remove("CHORES_DRIVE_FOLDER_ID")
        .arg("convert")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Drive folder configured"));
}

#[test]
fn test_rewire_json_report() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("workflow.json"),
        r#"{"connections": {
  "Gate": {"main": [[], [{"node": "Get Latest Branch SHA", "type": "main", "index": 0}]]},
  "Get Latest Branch SHA": {"main": [[{"node": "Create New File", "type": "main", "index": 0}]]}
}}"#,
    )
    .unwrap();

    let output = chores()
        .current_dir(dir.path())
        .args(["rewire", "workflow.json", "--dry-run", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report["redirected"],
        json!([{"source": "Gate", "from": "Get Latest Branch SHA", "to": "Create New File"}])
    );
    assert_eq!(report["removed"], json!(["Get Latest Branch SHA"]));
    assert_eq!(report["dangling"], json!([]));
    assert_eq!(
        report["downstream"],
        json!({"Get Latest Branch SHA": "Create New File"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_empty_folder_exits_with_one() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("orderBy", "createdTime desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .env("CHORES_DRIVE_ACCESS_TOKEN", "token")
        .env("CHORES_DRIVE_API_BASE", mock_server.uri())
        .env("CHORES_DRIVE_FOLDER_ID", "folder-9")
        .arg("convert")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No HTML files found!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_rejected_token_reports_auth_hint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/file-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .env("CHORES_DRIVE_ACCESS_TOKEN", "stale")
        .env("CHORES_DRIVE_API_BASE", mock_server.uri())
        .args(["convert", "file-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DRIVE_AUTH"))
        .stderr(predicate::str::contains("Hint: refresh the cached token file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blogs_empty_result_writes_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .env("CHORES_BLOG_ENDPOINT", format!("{}/api/blogs", mock_server.uri()))
        .arg("blogs")
        .assert()
        .success()
        .stdout(predicate::str::contains("No blogs found or error occurred."));

    assert!(!dir.path().join("blogs_data.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blogs_saves_listing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("published", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": 7, "slug": "draft"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    chores()
        .current_dir(dir.path())
        .env("CHORES_BLOG_ENDPOINT", format!("{}/api/blogs", mock_server.uri()))
        .args(["blogs", "--published", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. ID: 7"))
        .stdout(predicate::str::contains("Data saved to blogs_data.json"));

    let saved: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("blogs_data.json")).unwrap())
            .unwrap();
    assert_eq!(saved, json!([{"id": 7, "slug": "draft"}]));
}
