#![allow(clippy::result_large_err)]

use super::{ChoresConfig, DEFAULT_CONFIG_FILE};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from a directory (dir/chores.toml)
    /// Environment variables override config file values
    /// A missing file falls back to defaults + env vars
    pub fn load_from_dir(dir: &Path) -> Result<ChoresConfig, AppError> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();
        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from a path the user asked for explicitly; the file must exist
    pub fn load_explicit(path: &Path) -> Result<ChoresConfig, AppError> {
        let mut config = Self::load_from_file(path)?.ok_or_else(|| {
            AppError::new(
                ErrorCategory::NotFoundError,
                format!("Config file {} does not exist", path.display()),
            )
        })?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Resolve `--config` if given, otherwise look in the current directory
    pub fn resolve(explicit: Option<&Path>) -> Result<ChoresConfig, AppError> {
        match explicit {
            Some(path) => Self::load_explicit(path),
            None => {
                let cwd = env::current_dir()?;
                Self::load_from_dir(&cwd)
            }
        }
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ChoresConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ChoresConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(config: &mut ChoresConfig) {
        if let Ok(folder_id) = env::var("CHORES_DRIVE_FOLDER_ID") {
            config.drive.folder_id = Some(folder_id);
        }

        if let Ok(token_file) = env::var("CHORES_DRIVE_TOKEN_FILE") {
            config.drive.token_file = PathBuf::from(token_file);
        }

        if let Ok(api_base) = env::var("CHORES_DRIVE_API_BASE") {
            config.drive.api_base = api_base.clone();
            config.drive.upload_base = api_base;
        }

        if let Ok(endpoint) = env::var("CHORES_BLOG_ENDPOINT") {
            config.blog.endpoint = endpoint;
        }

        if let Ok(timeout_str) = env::var("CHORES_BLOG_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.blog.timeout_secs = timeout;
            }
        }

        if let Ok(output_file) = env::var("CHORES_BLOG_OUTPUT_FILE") {
            config.blog.output_file = PathBuf::from(output_file);
        }

        if let Ok(default_file) = env::var("CHORES_REWIRE_FILE") {
            config.rewire.default_file = PathBuf::from(default_file);
        }

        if let Ok(branch_str) = env::var("CHORES_REWIRE_BRANCH_INDEX") {
            if let Ok(branch_index) = branch_str.parse::<usize>() {
                config.rewire.branch_index = branch_index;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "CHORES_DRIVE_FOLDER_ID - Drive folder scanned by `convert` without a file id",
            "CHORES_DRIVE_TOKEN_FILE - Cached Drive token file (default: token.json)",
            "CHORES_DRIVE_ACCESS_TOKEN - Drive access token, bypasses the token file",
            "CHORES_DRIVE_API_BASE - Override both Drive API base URLs",
            "CHORES_BLOG_ENDPOINT - Blog listing endpoint (default: https://programmx.com/api/blogs)",
            "CHORES_BLOG_TIMEOUT_SECS - Blog request timeout in seconds (default: 30)",
            "CHORES_BLOG_OUTPUT_FILE - Blog dump file (default: blogs_data.json)",
            "CHORES_REWIRE_FILE - Default workflow file for `rewire` (default: WORKFLOW_FIXED_COMPLETE.json)",
            "CHORES_REWIRE_BRANCH_INDEX - Output branch inspected by `rewire` (default: 1)",
            "CHORES_QUIET - Set to 1 to silence console logging",
        ]
    }
}
