use chores::cli::{self, Args};
use chores::core::{DefaultErrorReporter, ErrorReporter};
use chores::logging;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _logging_guard = match logging::init(&args) {
        Ok(guard) => Some(guard),
        Err(err) => {
            DefaultErrorReporter::new()
                .report_warning("logging disabled", Some(format!("{:#}", err)));
            None
        }
    };

    match cli::run(args).await {
        Ok(code) => code,
        Err(err) => {
            DefaultErrorReporter::new().report_any(&err);
            ExitCode::FAILURE
        }
    }
}
