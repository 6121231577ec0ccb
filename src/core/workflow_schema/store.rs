#![allow(clippy::result_large_err)] // Store loading returns AppError to keep the failing path in context.

use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use intake_types::{
    ComponentTemplateRow, RouteOptionRow, RouteRow, RowId, StepComponentRow, StepRow,
    WorkflowRow, WorkflowStepRow,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Member step of a workflow, joined with its step row.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberStep {
    pub step_id: RowId,
    pub name: String,
    pub is_start: bool,
}

/// Component instance joined with the template version it references.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedComponent {
    pub position: i64,
    pub template: ComponentTemplateRow,
    pub overrides: Value,
}

impl PlacedComponent {
    /// Template defaults with the instance overrides merged on top.
    pub fn merged_props(&self) -> Value {
        deep_merge(
            &parse_props(&self.template.default_props),
            &parse_props(&self.overrides),
        )
    }
}

/// Read access to the authoring tables. Every publish reads fresh rows.
pub trait AuthoringStore {
    fn workflow(&self, workflow_id: RowId) -> Option<WorkflowRow>;
    /// Membership rows in authoring order, de-duplicated by step id.
    fn member_steps(&self, workflow_id: RowId) -> Vec<MemberStep>;
    fn routes(&self, workflow_id: RowId) -> Vec<RouteRow>;
    fn route_options(&self, workflow_id: RowId) -> Vec<RouteOptionRow>;
    /// Component instances of a step ordered by position.
    fn step_components(&self, step_id: RowId) -> Vec<PlacedComponent>;
    fn templates(&self, template_ids: &[RowId]) -> Vec<ComponentTemplateRow>;
}

/// Table dump of the authoring store, one vector per table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthoringSnapshot {
    #[serde(default)]
    pub workflows: Vec<WorkflowRow>,
    #[serde(default)]
    pub steps: Vec<StepRow>,
    #[serde(default)]
    pub workflow_steps: Vec<WorkflowStepRow>,
    #[serde(default)]
    pub routes: Vec<RouteRow>,
    #[serde(default)]
    pub route_options: Vec<RouteOptionRow>,
    #[serde(default)]
    pub templates: Vec<ComponentTemplateRow>,
    #[serde(default)]
    pub step_components: Vec<StepComponentRow>,
}

impl AuthoringSnapshot {
    /// Load a snapshot from a `.json`, `.yaml` or `.yml` file.
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|err| {
            AppError::new(
                ErrorCategory::InputError,
                format!("failed to read snapshot {}: {}", path.display(), err),
            )
            .with_code(codes::SNAPSHOT_UNREADABLE)
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        let parsed = if is_yaml {
            serde_yaml::from_str(&text).map_err(|err| err.to_string())
        } else {
            serde_json::from_str(&text).map_err(|err| err.to_string())
        };
        parsed.map_err(|err| {
            AppError::new(
                ErrorCategory::InputError,
                format!("failed to parse snapshot {}: {}", path.display(), err),
            )
            .with_code(codes::SNAPSHOT_UNREADABLE)
        })
    }
}

/// In-memory store over an [`AuthoringSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshot: AuthoringSnapshot,
}

impl SnapshotStore {
    pub fn new(snapshot: AuthoringSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        AuthoringSnapshot::load_from_file(path).map(Self::new)
    }

    pub fn snapshot(&self) -> &AuthoringSnapshot {
        &self.snapshot
    }

    fn template(&self, template_id: RowId) -> Option<&ComponentTemplateRow> {
        self.snapshot
            .templates
            .iter()
            .find(|template| template.id == template_id)
    }
}

impl AuthoringStore for SnapshotStore {
    fn workflow(&self, workflow_id: RowId) -> Option<WorkflowRow> {
        self.snapshot
            .workflows
            .iter()
            .find(|workflow| workflow.id == workflow_id)
            .cloned()
    }

    fn member_steps(&self, workflow_id: RowId) -> Vec<MemberStep> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for row in self
            .snapshot
            .workflow_steps
            .iter()
            .filter(|row| row.workflow_id == workflow_id)
        {
            let Some(step) = self.snapshot.steps.iter().find(|step| step.id == row.step_id) else {
                tracing::warn!(step_id = row.step_id, "membership row references unknown step");
                continue;
            };
            if !seen.insert(row.step_id) {
                tracing::warn!(step_id = row.step_id, "duplicate membership row ignored");
                continue;
            }
            members.push(MemberStep {
                step_id: step.id,
                name: step.name.clone(),
                is_start: row.is_start,
            });
        }
        members
    }

    fn routes(&self, workflow_id: RowId) -> Vec<RouteRow> {
        self.snapshot
            .routes
            .iter()
            .filter(|route| route.workflow_id == workflow_id)
            .cloned()
            .collect()
    }

    fn route_options(&self, workflow_id: RowId) -> Vec<RouteOptionRow> {
        self.snapshot
            .route_options
            .iter()
            .filter(|option| option.workflow_id == workflow_id)
            .cloned()
            .collect()
    }

    fn step_components(&self, step_id: RowId) -> Vec<PlacedComponent> {
        let mut rows: Vec<&StepComponentRow> = self
            .snapshot
            .step_components
            .iter()
            .filter(|row| row.step_id == step_id)
            .collect();
        rows.sort_by_key(|row| row.position);
        rows.into_iter()
            .filter_map(|row| {
                let Some(template) = self.template(row.template_id) else {
                    tracing::warn!(
                        step_id,
                        template_id = row.template_id,
                        "step component references unknown template"
                    );
                    return None;
                };
                Some(PlacedComponent {
                    position: row.position,
                    template: template.clone(),
                    overrides: row.props_overrides.clone(),
                })
            })
            .collect()
    }

    fn templates(&self, template_ids: &[RowId]) -> Vec<ComponentTemplateRow> {
        template_ids
            .iter()
            .filter_map(|id| self.template(*id).cloned())
            .collect()
    }
}

/// Parse a property column. Legacy rows store JSON text; unparsable text yields `{}`.
pub fn parse_props(raw: &Value) -> Value {
    match raw {
        Value::Null => Value::Object(Map::new()),
        Value::String(text) => serde_json::from_str::<Value>(text)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new())),
        other => other.clone(),
    }
}

/// Recursively overlay `overrides` onto `defaults`.
///
/// Objects merge key by key, arrays are replaced wholesale, and a null
/// override leaves the default in place.
pub fn deep_merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (_, Value::Null) => defaults.clone(),
        (Value::Object(base), Value::Object(over)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                let next = match base.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overrides.clone(),
    }
}
