use super::i18n::LocalizedText;
use super::normalize::NormalizedComponent;
use super::routing::{BranchRule, ResolvedRouting};
use super::store::PlacedComponent;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use intake_types::{RowId, WorkflowRow, WorkflowStatus};
use serde::{Serialize, Serializer};

/// Published step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStep {
    pub step_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub components: Vec<NormalizedComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branching: Option<Vec<BranchRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_next_step_id: Option<String>,
}

impl NormalizedStep {
    pub fn new(
        slug: impl Into<String>,
        name: &str,
        components: Vec<NormalizedComponent>,
        routing: ResolvedRouting,
    ) -> Self {
        Self {
            step_id: slug.into(),
            kind: "schema",
            title: LocalizedText::uniform(name),
            description: LocalizedText::default(),
            components,
            next_step_id: routing.next_step_id,
            branching: routing.branching,
            default_next_step_id: routing.default_next_step_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub id: RowId,
    pub name: String,
    pub status: WorkflowStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaCounts {
    pub steps: usize,
    pub components: usize,
}

/// Usage of one template version across the published steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateUsage {
    pub id: RowId,
    pub template_key: String,
    pub version: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMeta {
    pub schema_version: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub generated_at: DateTime<Utc>,
    pub workflow: WorkflowSnapshot,
    pub counts: SchemaCounts,
    pub templates: Vec<TemplateUsage>,
}

/// The document handed to the form renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedSchema {
    pub steps: Vec<NormalizedStep>,
    pub meta: SchemaMeta,
}

fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Per-version template usage in first-seen order.
#[derive(Debug, Default)]
pub struct TemplateUsageTracker {
    usage: IndexMap<(String, i64), TemplateUsage>,
}

impl TemplateUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, component: &PlacedComponent) {
        let template = &component.template;
        let entry = self
            .usage
            .entry((template.template_key.clone(), template.version))
            .or_insert_with(|| TemplateUsage {
                id: template.id,
                template_key: template.template_key.clone(),
                version: template.version,
                kind: template.component_type.trim().to_ascii_lowercase(),
                count: 0,
            });
        entry.id = template.id;
        entry.count += 1;
    }

    /// Distinct template row ids in first-seen order.
    pub fn template_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = Vec::new();
        for usage in self.usage.values() {
            if !ids.contains(&usage.id) {
                ids.push(usage.id);
            }
        }
        ids
    }

    pub fn into_usage(self) -> Vec<TemplateUsage> {
        self.usage.into_values().collect()
    }
}

/// Combine the ordered steps with run metadata.
pub fn assemble_schema(
    workflow: &WorkflowRow,
    steps: Vec<NormalizedStep>,
    usage: TemplateUsageTracker,
    schema_version: &str,
    generated_at: DateTime<Utc>,
) -> PublishedSchema {
    let counts = SchemaCounts {
        steps: steps.len(),
        components: steps.iter().map(|step| step.components.len()).sum(),
    };
    PublishedSchema {
        meta: SchemaMeta {
            schema_version: schema_version.to_string(),
            generated_at,
            workflow: WorkflowSnapshot {
                id: workflow.id,
                name: workflow.name.clone(),
                status: workflow.status,
            },
            counts,
            templates: usage.into_usage(),
        },
        steps,
    }
}
