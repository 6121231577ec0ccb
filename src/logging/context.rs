use crate::cli::Command;
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A developer running the publisher from a terminal.
    LocalDev,
    /// Continuous integration; console output stays quiet unless configured.
    Ci,
}

impl ExecutionContext {
    /// Returns `true` when console sinks are off by default.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Ci)
    }
}

/// Derive the active execution context from a parsed CLI command plus environment.
pub fn detect_context(command: &Command) -> ExecutionContext {
    if ci_enabled() {
        return ExecutionContext::Ci;
    }
    match command {
        Command::Publish(_) | Command::Check(_) | Command::Types => ExecutionContext::LocalDev,
    }
}

fn ci_enabled() -> bool {
    env::var("CI")
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}
