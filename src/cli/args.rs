use clap::Args;
use std::path::PathBuf;

/// Snapshot and workflow selection shared by `publish` and `check`.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Authoring snapshot exported from the template store (.json, .yaml or .yml)
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Workflow row id to build
    #[arg(long, value_name = "ID")]
    pub workflow: i64,

    /// Render every used template before building
    #[arg(long)]
    pub audit: bool,

    /// Override meta.schemaVersion
    #[arg(long, value_name = "VERSION")]
    pub schema_version: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Workspace holding intake-publisher.toml (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Directory receiving the schema and meta files
    #[arg(long, value_name = "DIR", help_heading = "Output Options")]
    pub out_dir: Option<PathBuf>,

    /// Refuse to write when the contract lint reports errors
    #[arg(long, help_heading = "Output Options")]
    pub strict: bool,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Workspace holding intake-publisher.toml (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Emit either terminal-friendly text or machine-readable JSON
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable diagnostics, one per line
    Text,
    /// JSON payload suitable for downstream tooling
    Json,
}
