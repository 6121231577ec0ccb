#![allow(clippy::result_large_err)]

//! Builds the published intake form schema for one workflow.
//!
//! The pipeline reads fresh authoring rows, orders the steps by routing
//! reachability, normalizes each step's components, folds conditional
//! children under their revealing option and assembles the `{ steps, meta }`
//! document. Only two failures are fatal to a build: an unsupported component
//! type and a failed template audit. Everything else degrades with a warning.

pub mod assemble;
pub mod audit;
pub mod component_type;
pub mod contract;
pub mod embed;
pub mod i18n;
pub mod normalize;
pub mod props;
pub mod routing;
pub mod slug;
pub mod store;
pub mod validation;
pub mod writer;

use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use assemble::{assemble_schema, NormalizedStep, PublishedSchema, TemplateUsageTracker};
use audit::{audit_templates, TemplateRenderer};
use chrono::Utc;
use contract::{has_errors, ContractInput, ContractRegistry, LintResult, LintSeverity};
use intake_types::RowId;
use normalize::{normalize_step, NormalizeOptions, RunRegistry, StepInput};
use routing::{resolve_routing, RoutingPlan};
use serde_json::json;
use std::path::PathBuf;
use store::AuthoringStore;
use writer::{write_published, PublishedFiles};

pub const DEFAULT_SCHEMA_VERSION: &str = "1.1";
pub const DEFAULT_AUDIT_DETAIL_CHARS: usize = 200;

/// Per-build settings.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub schema_version: String,
    pub audit_templates: bool,
    pub audit_detail_max_chars: usize,
    pub normalize: NormalizeOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            audit_templates: false,
            audit_detail_max_chars: DEFAULT_AUDIT_DETAIL_CHARS,
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildOutput {
    pub schema: PublishedSchema,
    pub routing: RoutingPlan,
}

impl BuildOutput {
    /// Run the built-in contract rules against this build.
    pub fn lint(&self) -> Vec<LintResult> {
        ContractRegistry::new().run(&ContractInput {
            schema: &self.schema,
            routing: &self.routing,
        })
    }
}

/// Build the schema for `workflow_id` from the current authoring rows.
pub fn build_workflow_schema(
    store: &dyn AuthoringStore,
    workflow_id: RowId,
    options: &BuildOptions,
    renderer: &dyn TemplateRenderer,
) -> Result<BuildOutput, AppError> {
    let workflow = store.workflow(workflow_id).ok_or_else(|| {
        AppError::new(
            ErrorCategory::InputError,
            format!("Workflow {} not found", workflow_id),
        )
        .with_code(codes::WORKFLOW_NOT_FOUND)
        .with_details(json!({ "workflow_id": workflow_id }))
    })?;
    tracing::info!(workflow_id, name = %workflow.name, "building workflow schema");

    let members = store.member_steps(workflow_id);
    let routing = resolve_routing(
        &members,
        &store.routes(workflow_id),
        &store.route_options(workflow_id),
    );

    let mut registry = RunRegistry::new();
    let mut usage = TemplateUsageTracker::new();
    let mut steps = Vec::with_capacity(routing.order().len());

    for &step_id in routing.order() {
        let Some(member) = members.iter().find(|member| member.step_id == step_id) else {
            continue;
        };
        let placed = store.step_components(step_id);
        for component in &placed {
            usage.record(component);
        }

        let input = StepInput {
            step_id,
            step_name: &member.name,
            route: routing.route(step_id),
        };
        let normalized = normalize_step(&input, &placed, &options.normalize, &mut registry)?;
        let resolved = routing.resolve(step_id, normalized.branch_var.as_deref());
        let components = embed::embed_conditional_children(normalized);

        let slug = routing.slug(step_id).unwrap_or("step");
        tracing::debug!(step_id, slug, components = components.len(), "step normalized");
        steps.push(NormalizedStep::new(slug, &member.name, components, resolved));
    }

    if options.audit_templates {
        let templates = store.templates(&usage.template_ids());
        audit_templates(&templates, renderer, options.audit_detail_max_chars)?;
    }

    let schema = assemble_schema(&workflow, steps, usage, &options.schema_version, Utc::now());
    tracing::info!(
        workflow_id,
        steps = schema.meta.counts.steps,
        components = schema.meta.counts.components,
        unreachable = routing.unreachable().len(),
        "workflow schema built"
    );
    Ok(BuildOutput { schema, routing })
}

/// Where and how a built schema is persisted.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub output_dir: PathBuf,
    pub schema_file: String,
    pub meta_file: String,
    pub strict_contract: bool,
}

#[derive(Debug)]
pub struct PublishOutcome {
    pub files: PublishedFiles,
    pub schema: PublishedSchema,
    pub diagnostics: Vec<LintResult>,
}

/// Build, lint and write a workflow schema. Nothing is written on failure.
pub fn publish_workflow(
    store: &dyn AuthoringStore,
    workflow_id: RowId,
    build: &BuildOptions,
    publish: &PublishOptions,
    renderer: &dyn TemplateRenderer,
) -> Result<PublishOutcome, AppError> {
    let output = build_workflow_schema(store, workflow_id, build, renderer)?;
    let diagnostics = output.lint();
    for diagnostic in &diagnostics {
        tracing::warn!(
            code = %diagnostic.code,
            severity = %diagnostic.severity,
            location = diagnostic.location.as_deref().unwrap_or("-"),
            "{}",
            diagnostic.message
        );
    }

    if publish.strict_contract && has_errors(&diagnostics) {
        let errors: Vec<&LintResult> = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == LintSeverity::Error)
            .collect();
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("Schema rejected by {} contract error(s)", errors.len()),
        )
        .with_code(codes::CONTRACT_REJECTED)
        .with_details(json!({ "diagnostics": errors })));
    }

    let files = write_published(
        &publish.output_dir,
        &publish.schema_file,
        &publish.meta_file,
        &output.schema,
    )?;
    Ok(PublishOutcome {
        files,
        schema: output.schema,
        diagnostics,
    })
}
