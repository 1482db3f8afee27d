pub mod args;
pub mod commands;

pub use args::{BlogsArgs, ConvertArgs, RewireArgs};
use crate::core::{ConfigLoader, ConfigValidator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
CHORES:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "chores")]
#[command(version = crate::VERSION)]
#[command(about = "One-shot automation chores for Drive, n8n workflows and the blog API")]
#[command(help_template = HELP_TEMPLATE)]
#[command(after_long_help = configuration_help())]
pub struct Args {
    /// Path to the config file (default: ./chores.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Silence log output on the console
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Convert an HTML file in Drive into a Google Doc",
        long_about = "Convert downloads the HTML file (or the newest one in the configured folder) and uploads it again as a Google Doc in the same folder.",
        after_help = "Examples:\n    chores convert\n    chores convert 1AbCdEf --token-file ~/.config/chores/token.json"
    )]
    Convert(ConvertArgs),
    #[command(
        about = "Point workflow links past deprecated nodes and drop those nodes' connections",
        long_about = "Rewire redirects links on the inspected output branch that target a deprecated node to that node's replacement, then deletes the deprecated nodes' own connection entries. INPUT is overwritten unless OUTPUT is given.",
        after_help = "Examples:\n    chores rewire\n    chores rewire workflow.json fixed.json --dry-run\n    chores rewire workflow.json --dry-run --json"
    )]
    Rewire(RewireArgs),
    #[command(
        about = "List blog ids and slugs and save them to a file",
        long_about = "Blogs queries the blog listing endpoint, prints every post's id and slug, and saves them as JSON.",
        after_help = "Example:\n    chores blogs --published false --output drafts.json"
    )]
    Blogs(BlogsArgs),
}

fn configuration_help() -> String {
    let mut help = String::from(
        "CONFIGURATION:\n    Settings are read from ./chores.toml (or --config), then overridden by:\n",
    );
    for line in ConfigLoader::env_var_documentation() {
        help.push_str("    ");
        help.push_str(line);
        help.push('\n');
    }
    help
}

pub async fn run(args: Args) -> crate::Result<ExitCode> {
    let config = ConfigLoader::resolve(args.config.as_deref())?;
    ConfigValidator::validate(&config)?;

    match args.command {
        Command::Convert(convert_args) => commands::convert(convert_args, &config).await,
        Command::Rewire(rewire_args) => commands::rewire(rewire_args, &config),
        Command::Blogs(blogs_args) => commands::blogs(blogs_args, &config).await,
    }
}
