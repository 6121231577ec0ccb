#![allow(clippy::result_large_err)]

use super::store::parse_props;
use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use intake_types::ComponentTemplateRow;
use minijinja::{context, Environment};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a [`TemplateRenderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template failed to compile: {0}")]
    Compile(String),
    #[error("template failed to render: {0}")]
    Render(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::SyntaxError => RenderError::Compile(err.to_string()),
            _ => RenderError::Render(err.to_string()),
        }
    }
}

/// Renders a template source against a property object.
pub trait TemplateRenderer {
    fn render(&self, source: &str, props: &Value) -> Result<String, RenderError>;
}

/// Jinja-compatible renderer. `{% include %}` and `{% import %}` resolve
/// against the configured search paths in order.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        let mut env = Environment::new();
        if !search_paths.is_empty() {
            env.set_loader(move |name| {
                for dir in &search_paths {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        return fs::read_to_string(&candidate).map(Some).map_err(|err| {
                            minijinja::Error::new(
                                minijinja::ErrorKind::InvalidOperation,
                                format!("failed to read template {}", candidate.display()),
                            )
                            .with_source(err)
                        });
                    }
                }
                Ok(None)
            });
        }
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, source: &str, props: &Value) -> Result<String, RenderError> {
        Ok(self.env.render_str(source, context! { props => props })?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditReason {
    MissingTemplate,
    RenderError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditFailure {
    pub template_key: String,
    pub version: i64,
    pub reason: AuditReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Compile-render every template with its stored defaults.
///
/// All templates are checked before failing; the error carries the full batch.
pub fn audit_templates(
    templates: &[ComponentTemplateRow],
    renderer: &dyn TemplateRenderer,
    detail_max_chars: usize,
) -> Result<(), AppError> {
    let mut failures = Vec::new();
    for template in templates {
        let source = template
            .render_source
            .as_deref()
            .filter(|source| !source.trim().is_empty());
        let Some(source) = source else {
            failures.push(AuditFailure {
                template_key: template.template_key.clone(),
                version: template.version,
                reason: AuditReason::MissingTemplate,
                detail: None,
            });
            continue;
        };
        let props = parse_props(&template.default_props);
        if let Err(err) = renderer.render(source, &props) {
            tracing::warn!(
                template_key = %template.template_key,
                version = template.version,
                error = %err,
                "template failed audit render"
            );
            failures.push(AuditFailure {
                template_key: template.template_key.clone(),
                version: template.version,
                reason: AuditReason::RenderError,
                detail: Some(err.to_string().chars().take(detail_max_chars).collect()),
            });
        }
    }

    if failures.is_empty() {
        tracing::info!(templates = templates.len(), "template audit passed");
        return Ok(());
    }
    Err(AppError::new(
        ErrorCategory::TemplateAuditError,
        format!("Template audit failed for {} template(s)", failures.len()),
    )
    .with_code(codes::TEMPLATE_AUDIT_FAILED)
    .with_details(json!({ "templates": failures })))
}
