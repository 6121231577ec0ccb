use crate::cli::args::{CheckArgs, OutputFormat, PublishArgs, SourceArgs};
use crate::core::config::{ConfigLoader, ConfigValidator, PublisherConfig};
use crate::core::workflow_schema::audit::MiniJinjaRenderer;
use crate::core::workflow_schema::component_type::{ComponentType, TYPE_ALIASES};
use crate::core::workflow_schema::contract::{has_errors, LintResult, LintSeverity};
use crate::core::workflow_schema::store::SnapshotStore;
use crate::core::workflow_schema::{build_workflow_schema, publish_workflow};
use crate::Result;
use anyhow::anyhow;
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};

/// Everything a build needs, resolved from config, flags and the snapshot.
struct Prepared {
    workspace: PathBuf,
    config: PublisherConfig,
    store: SnapshotStore,
    renderer: MiniJinjaRenderer,
}

fn prepare(source: &SourceArgs, workspace: Option<&Path>) -> Result<Prepared> {
    let workspace = match workspace {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };
    let mut config = ConfigLoader::load_from_workspace(&workspace)?;
    if let Some(version) = &source.schema_version {
        config.publish.schema_version = version.clone();
    }
    if source.audit {
        config.publish.audit_templates = true;
    }

    let store = SnapshotStore::load_from_file(&source.snapshot)?;
    let renderer = MiniJinjaRenderer::new(config.template_search_paths(&workspace));
    Ok(Prepared {
        workspace,
        config,
        store,
        renderer,
    })
}

pub fn publish(args: PublishArgs) -> Result<()> {
    tracing::info!(workflow_id = args.source.workflow, "publishing workflow");
    let mut prepared = prepare(&args.source, args.workspace.as_deref())?;
    if let Some(out_dir) = &args.out_dir {
        prepared.config.publish.output_dir = out_dir.clone();
    }
    if args.strict {
        prepared.config.publish.strict_contract = true;
    }
    ConfigValidator::validate(&prepared.config)?;

    let outcome = publish_workflow(
        &prepared.store,
        args.source.workflow,
        &prepared.config.build_options(),
        &prepared.config.publish_options(&prepared.workspace),
        &prepared.renderer,
    )?;

    let counts = outcome.schema.meta.counts;
    println!(
        "Published workflow {} ({} steps, {} components)",
        args.source.workflow, counts.steps, counts.components
    );
    println!("  schema: {}", outcome.files.schema.display());
    println!("  meta:   {}", outcome.files.meta.display());
    if !outcome.diagnostics.is_empty() {
        println!("  {} contract diagnostic(s); run `check` for details", outcome.diagnostics.len());
    }
    Ok(())
}

pub fn check(args: CheckArgs) -> Result<()> {
    tracing::info!(workflow_id = args.source.workflow, "checking workflow");
    let prepared = prepare(&args.source, args.workspace.as_deref())?;
    ConfigValidator::validate(&prepared.config)?;

    let output = build_workflow_schema(
        &prepared.store,
        args.source.workflow,
        &prepared.config.build_options(),
        &prepared.renderer,
    )?;
    let diagnostics = output.lint();
    let unreachable: Vec<&str> = output
        .routing
        .unreachable()
        .iter()
        .filter_map(|id| output.routing.slug(*id))
        .collect();

    match args.format {
        OutputFormat::Text => {
            let counts = output.schema.meta.counts;
            println!(
                "Workflow {}: {} steps, {} components",
                args.source.workflow, counts.steps, counts.components
            );
            if !unreachable.is_empty() {
                println!("Unreachable steps: {}", unreachable.join(", "));
            }
            if diagnostics.is_empty() {
                println!("No contract diagnostics");
            }
            for diagnostic in &diagnostics {
                println!("{}", format_diagnostic(diagnostic));
            }
        }
        OutputFormat::Json => {
            let payload = json!({
                "workflow": args.source.workflow,
                "counts": output.schema.meta.counts,
                "unreachable": unreachable,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    if has_errors(&diagnostics) {
        let errors = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == LintSeverity::Error)
            .count();
        return Err(anyhow!("contract check failed with {} error(s)", errors));
    }
    Ok(())
}

pub fn types() -> Result<()> {
    println!("Supported component types:");
    for kind in ComponentType::ALL {
        println!("  {}", kind);
    }
    println!("Aliases:");
    for (alias, kind) in TYPE_ALIASES {
        println!("  {} -> {}", alias, kind);
    }
    Ok(())
}

fn format_diagnostic(diagnostic: &LintResult) -> String {
    let mut line = format!(
        "{} {} {}",
        diagnostic.severity, diagnostic.code, diagnostic.message
    );
    if let Some(location) = &diagnostic.location {
        line.push_str(&format!(" at {}", location));
    }
    if let Some(suggestion) = &diagnostic.suggestion {
        line.push_str(&format!(" ({})", suggestion));
    }
    line
}
