use clap::{ArgAction, Args};
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Default)]
pub struct ConvertArgs {
    /// Drive file ID of the HTML file (default: newest HTML file in the configured folder)
    #[arg(value_name = "FILE_ID")]
    pub file_id: Option<String>,

    /// Folder to search and to use as parent when the source has none
    #[arg(long, value_name = "FOLDER_ID")]
    pub folder: Option<String>,

    /// Cached token file (default: token.json)
    #[arg(long, value_name = "FILE", help_heading = "Credentials")]
    pub token_file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RewireArgs {
    /// Workflow JSON to read (default: WORKFLOW_FIXED_COMPLETE.json)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Where to write the result (default: overwrite INPUT)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Report changes without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full rewrite report as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Output branch to inspect for links to deprecated nodes (default: 1)
    #[arg(long, value_name = "INDEX", help_heading = "Rule Overrides")]
    pub branch: Option<usize>,

    /// Only inspect connection entries whose name starts with PREFIX
    #[arg(long, value_name = "PREFIX", help_heading = "Rule Overrides")]
    pub only_prefix: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct BlogsArgs {
    /// List published (true) or unpublished (false) posts
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub published: bool,

    /// Where to save the id/slug dump (default: blogs_data.json)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Override the blog listing endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}
