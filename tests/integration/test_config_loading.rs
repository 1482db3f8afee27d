use chores::core::config::{ConfigLoader, ConfigValidator};
use chores::core::types::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_chores_env() {
    for v in &[
        "CHORES_DRIVE_FOLDER_ID",
        "CHORES_DRIVE_TOKEN_FILE",
        "CHORES_DRIVE_API_BASE",
        "CHORES_BLOG_ENDPOINT",
        "CHORES_BLOG_TIMEOUT_SECS",
        "CHORES_BLOG_OUTPUT_FILE",
        "CHORES_REWIRE_FILE",
        "CHORES_REWIRE_BRANCH_INDEX",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();

    let config_content = r#"
[drive]
folder_id = "folder-123"
token_file = "secrets/token.json"

[blog]
endpoint = "https://blog.example/api/blogs"
timeout_secs = 5
output_file = "out/blogs.json"

[rewire]
default_file = "flows/publish.json"
branch_index = 0
source_prefix = "If File Exists"
rules = [
  { deprecated = "Old Step", replacement = "New Step" },
]

[logging]
default_level = "debug"
"#;

    fs::write(temp_dir.path().join("chores.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();

    assert_eq!(config.drive.folder_id.as_deref(), Some("folder-123"));
    assert_eq!(config.drive.token_file, PathBuf::from("secrets/token.json"));
    assert_eq!(config.drive.api_base, "https://www.googleapis.com");
    assert_eq!(config.blog.endpoint, "https://blog.example/api/blogs");
    assert_eq!(config.blog.timeout_secs, 5);
    assert_eq!(config.blog.output_file, PathBuf::from("out/blogs.json"));
    assert_eq!(config.rewire.default_file, PathBuf::from("flows/publish.json"));
    assert_eq!(config.rewire.branch_index, 0);
    assert_eq!(
        config.rewire.source_prefix.as_deref(),
        Some("If File Exists")
    );
    assert_eq!(config.rewire.rules.len(), 1);
    assert_eq!(config.rewire.rules[0].deprecated, "Old Step");
    assert!(ConfigValidator::validate(&config).is_ok());
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();

    assert!(config.drive.folder_id.is_none());
    assert_eq!(config.drive.token_file, PathBuf::from("token.json"));
    assert_eq!(config.blog.endpoint, "https://programmx.com/api/blogs");
    assert_eq!(config.blog.timeout_secs, 30);
    assert_eq!(config.blog.output_file, PathBuf::from("blogs_data.json"));
    assert_eq!(
        config.rewire.default_file,
        PathBuf::from("WORKFLOW_FIXED_COMPLETE.json")
    );
    assert_eq!(config.rewire.branch_index, 1);
    assert_eq!(config.rewire.rules.len(), 6);
    assert_eq!(config.rewire.rules[0].deprecated, "Get Latest Branch SHA");
    assert_eq!(config.rewire.rules[5].replacement, "Create New File5");
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("chores.toml"),
        "[blog]\ntimeout_secs = 5\n[rewire]\nbranch_index = 0\n",
    )
    .unwrap();

    env::set_var("CHORES_BLOG_TIMEOUT_SECS", "12");
    env::set_var("CHORES_REWIRE_BRANCH_INDEX", "not-a-number");
    env::set_var("CHORES_DRIVE_API_BASE", "http://127.0.0.1:9999");
    env::set_var("CHORES_DRIVE_FOLDER_ID", "env-folder");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_chores_env();

    assert_eq!(config.blog.timeout_secs, 12);
    assert_eq!(config.rewire.branch_index, 0);
    assert_eq!(config.drive.api_base, "http://127.0.0.1:9999");
    assert_eq!(config.drive.upload_base, "http://127.0.0.1:9999");
    assert_eq!(config.drive.folder_id.as_deref(), Some("env-folder"));
}

#[test]
#[serial]
fn test_explicit_config_must_exist() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");

    let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
    assert_eq!(err.category, ErrorCategory::NotFoundError);

    fs::write(&path, "[blog]\noutput_file = \"custom.json\"\n").unwrap();
    let config = ConfigLoader::resolve(Some(&path)).unwrap();
    assert_eq!(config.blog.output_file, PathBuf::from("custom.json"));
}

#[test]
#[serial]
fn test_malformed_toml_is_validation_error() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("chores.toml"), "[blog\nendpoint = ").unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
}

#[test]
#[serial]
fn test_validator_rejects_bad_values() {
    clear_chores_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("chores.toml"),
        "[blog]\ntimeout_secs = 0\n",
    )
    .unwrap();
    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert!(ConfigValidator::validate(&config).is_err());

    fs::write(
        temp_dir.path().join("chores.toml"),
        r#"
[rewire]
rules = [
  { deprecated = "A", replacement = "B" },
  { deprecated = "A", replacement = "C" },
]
"#,
    )
    .unwrap();
    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert!(err.message.contains("more than once"));
}
