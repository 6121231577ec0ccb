pub mod args;
pub mod commands;

pub use args::{CheckArgs, OutputFormat, PublishArgs, SourceArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "intake-publisher")]
#[command(version = crate::VERSION)]
#[command(about = "Publish bilingual intake form schemas from authored workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: export a snapshot of the template store, check the workflow, then publish it."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Build a workflow schema and write it",
        long_about = "Publish reads the authoring snapshot, builds the schema for one workflow, lints it and writes the schema plus its meta file.",
        after_help = "Example:\n    intake-publisher publish --snapshot store.json --workflow 3 --audit"
    )]
    Publish(PublishArgs),
    #[command(
        about = "Build and lint a workflow schema without writing",
        long_about = "Check runs the full build and the contract lint, prints the diagnostics and exits non-zero when any error is reported.",
        after_help = "Example:\n    intake-publisher check --snapshot store.yaml --workflow 3 --format json"
    )]
    Check(CheckArgs),
    #[command(
        about = "List supported component types",
        long_about = "Types prints the component vocabulary the normalizer accepts, including aliases."
    )]
    Types,
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Publish(publish_args) => commands::publish(publish_args),
        Command::Check(check_args) => commands::check(check_args),
        Command::Types => commands::types(),
    }
}
