use crate::cli::Args;
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A person running a chore from a terminal.
    Interactive,
    /// Cron jobs and other unattended runs that only want the command's own output.
    Quiet,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Quiet)
    }
}

/// Derive the active execution context from the parsed CLI arguments plus overrides.
pub fn detect_context(args: &Args) -> ExecutionContext {
    if args.quiet || quiet_override_enabled() {
        ExecutionContext::Quiet
    } else {
        ExecutionContext::Interactive
    }
}

fn quiet_override_enabled() -> bool {
    env::var("CHORES_QUIET")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
