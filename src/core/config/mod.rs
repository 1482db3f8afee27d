use crate::workflow::RewriteRule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chores.toml";

/// Top-level configuration loaded from chores.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChoresConfig {
    /// Drive conversion settings
    #[serde(default)]
    pub drive: DriveConfig,

    /// Blog listing settings
    #[serde(default)]
    pub blog: BlogConfig,

    /// Workflow connection rewiring settings
    #[serde(default)]
    pub rewire: RewireConfig,
}

/// Drive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Folder scanned for the latest HTML upload, also the fallback parent for new documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Cached OAuth token (JSON with an `access_token` member)
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    /// Base URL of the Drive metadata API
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,

    /// Base URL of the Drive media upload API
    #[serde(default = "default_drive_api_base")]
    pub upload_base: String,
}

/// Blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Blog listing endpoint
    #[serde(default = "default_blog_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_blog_timeout_secs")]
    pub timeout_secs: u64,

    /// Where the id/slug dump is written
    #[serde(default = "default_blog_output_file")]
    pub output_file: PathBuf,
}

/// Rewire configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewireConfig {
    /// Workflow file used when no positional path is given
    #[serde(default = "default_workflow_file")]
    pub default_file: PathBuf,

    /// Output branch inspected for links to deprecated nodes
    #[serde(default = "default_branch_index")]
    pub branch_index: usize,

    /// Only inspect connection entries whose name starts with this prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_prefix: Option<String>,

    /// Deprecated node name -> replacement target
    #[serde(default = "default_rules")]
    pub rules: Vec<RewriteRule>,
}

fn default_token_file() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_blog_endpoint() -> String {
    "https://programmx.com/api/blogs".to_string()
}

fn default_blog_timeout_secs() -> u64 {
    30
}

fn default_blog_output_file() -> PathBuf {
    PathBuf::from("blogs_data.json")
}

fn default_workflow_file() -> PathBuf {
    PathBuf::from("WORKFLOW_FIXED_COMPLETE.json")
}

fn default_branch_index() -> usize {
    1
}

pub(crate) fn default_rules() -> Vec<RewriteRule> {
    let mut rules = vec![RewriteRule::new("Get Latest Branch SHA", "Create New File")];
    for n in 1..=5 {
        rules.push(RewriteRule::new(
            format!("Get Latest Branch SHA{n}"),
            format!("Create New File{n}"),
        ));
    }
    rules
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            folder_id: None,
            token_file: default_token_file(),
            api_base: default_drive_api_base(),
            upload_base: default_drive_api_base(),
        }
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        BlogConfig {
            endpoint: default_blog_endpoint(),
            timeout_secs: default_blog_timeout_secs(),
            output_file: default_blog_output_file(),
        }
    }
}

impl Default for RewireConfig {
    fn default() -> Self {
        RewireConfig {
            default_file: default_workflow_file(),
            branch_index: default_branch_index(),
            source_prefix: None,
            rules: default_rules(),
        }
    }
}
