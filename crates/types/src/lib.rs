//! Relational row shapes read by the intake schema publisher.
//!
//! Each struct mirrors one table of the authoring store. The publisher never
//! writes these rows; it only reads them to build a publishable schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier type shared by every authoring table.
pub type RowId = i64;

/// Lifecycle status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::Draft => write!(f, "draft"),
            WorkflowStatus::Active => write!(f, "active"),
            WorkflowStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// `workflow` table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRow {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// `step` table row. Steps are reusable across workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub id: RowId,
    pub name: String,
}

/// `workflow_step` join row carrying the start flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStepRow {
    pub workflow_id: RowId,
    pub step_id: RowId,
    #[serde(default)]
    pub is_start: bool,
}

/// Routing mode of a `workflow_route` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    Linear,
    ByOption,
}

/// `workflow_route` row: one per (workflow, source step).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    pub workflow_id: RowId,
    pub source_step_id: RowId,
    pub mode: RouteMode,
    #[serde(default)]
    pub field_key: Option<String>,
    #[serde(default)]
    pub default_next_step_id: Option<RowId>,
}

/// `workflow_route_option` row mapping a literal option value to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptionRow {
    pub workflow_id: RowId,
    pub source_step_id: RowId,
    pub option_value: String,
    pub next_step_id: RowId,
}

/// `component_template` row. Several versions of one key may coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplateRow {
    pub id: RowId,
    pub template_key: String,
    pub version: i64,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub default_props: Value,
    /// Render source used by the template audit.
    #[serde(default)]
    pub render_source: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `step_component` row placing one template version inside a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepComponentRow {
    pub step_id: RowId,
    pub position: i64,
    pub template_id: RowId,
    #[serde(default)]
    pub props_overrides: Value,
}
