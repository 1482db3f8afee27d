use crate::{
    blog::{render_listing, save_blogs, BlogClient},
    cli::args::{BlogsArgs, ConvertArgs, RewireArgs},
    core::{config::ChoresConfig, AppError, ErrorCategory},
    drive::{convert_to_doc, resolve_access_token, DriveApi, DriveClient},
    workflow::{rewire_file, RewriteRules},
    Result,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use url::Url;

pub async fn convert(args: ConvertArgs, config: &ChoresConfig) -> Result<ExitCode> {
    let token_file = args
        .token_file
        .unwrap_or_else(|| config.drive.token_file.clone());
    let folder = args.folder.or_else(|| config.drive.folder_id.clone());

    let token = resolve_access_token(&token_file).map_err(AppError::from)?;
    let client = DriveClient::new(&config.drive.api_base, &config.drive.upload_base, token)
        .map_err(AppError::from)?;

    let file_id = match args.file_id {
        Some(id) => id,
        None => {
            let folder_id = folder.as_deref().ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ValidationError,
                    "no file id given and no Drive folder configured",
                )
                .with_suggestion("set drive.folder_id in chores.toml or pass --folder")
            })?;
            match client
                .latest_html(folder_id)
                .await
                .map_err(AppError::from)?
            {
                Some(file) => {
                    info!(id = %file.id, name = %file.name, "picked latest html file");
                    file.id
                }
                None => {
                    println!("No HTML files found!");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    };

    let created = convert_to_doc(&client, &file_id, folder.as_deref())
        .await
        .map_err(AppError::from)?;

    println!("Created Google Doc!");
    println!("Name: {}", created.name);
    match &created.web_view_link {
        Some(link) => println!("Link: {}", link),
        None => println!("ID: {}", created.id),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn rewire(args: RewireArgs, config: &ChoresConfig) -> Result<ExitCode> {
    let input = args
        .input
        .unwrap_or_else(|| config.rewire.default_file.clone());
    let output = args.output.unwrap_or_else(|| input.clone());

    let mut rules = RewriteRules::from_config(&config.rewire);
    if let Some(branch) = args.branch {
        rules = rules.with_branch_index(branch);
    }
    if args.only_prefix.is_some() {
        rules = rules.with_source_prefix(args.only_prefix);
    }

    let report = rewire_file(&input, &output, &rules, args.dry_run)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Cleanup complete!");
    println!("  - Updated {} connections", report.redirected.len());
    println!(
        "  - Removed {} deprecated node connections",
        report.removed.len()
    );
    if !report.dangling.is_empty() {
        println!(
            "  - {} links still point at removed nodes",
            report.dangling.len()
        );
    }
    if args.dry_run {
        println!("Dry run: {} was not written", output.display());
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn blogs(args: BlogsArgs, config: &ChoresConfig) -> Result<ExitCode> {
    let endpoint = args
        .endpoint
        .unwrap_or_else(|| config.blog.endpoint.clone());
    let endpoint = Url::parse(&endpoint).map_err(|e| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid blog endpoint {}: {}", endpoint, e),
        )
    })?;
    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.blog.timeout_secs));
    let output = args
        .output
        .unwrap_or_else(|| config.blog.output_file.clone());

    println!("Fetching blogs from {}...", endpoint);
    println!("{}", "-".repeat(50));

    let client = BlogClient::new(endpoint).with_timeout(timeout);
    let blogs = client.fetch(args.published).await;

    if blogs.is_empty() {
        println!("No blogs found or error occurred.");
        return Ok(ExitCode::SUCCESS);
    }

    print!("{}", render_listing(&blogs));
    save_blogs(&output, &blogs)?;
    println!("Data saved to {}", output.display());
    Ok(ExitCode::SUCCESS)
}
