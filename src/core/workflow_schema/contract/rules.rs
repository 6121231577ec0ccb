use super::{ContractInput, ContractRule, LintResult, LintSeverity};
use crate::core::workflow_schema::normalize::NormalizedComponent;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

pub fn built_in_rules() -> Vec<Box<dyn ContractRule>> {
    vec![
        Box::new(MissingIdRule),
        Box::new(StorageKeyFormatRule),
        Box::new(DuplicateStorageKeyRule),
        Box::new(ChoiceOptionsRule),
        Box::new(SummaryListRowsRule),
        Box::new(UnreachableStepRule),
        Box::new(DroppedRouteEdgeRule),
        Box::new(UnresolvedConditionalChildRule),
    ]
}

fn is_kebab_key(key: &str) -> bool {
    static KEBAB: OnceLock<Option<Regex>> = OnceLock::new();
    KEBAB
        .get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(key))
}

fn location(step_id: &str, component: &NormalizedComponent) -> Option<String> {
    Some(format!("{}/{}", step_id, component.id()))
}

/// PUB-LINT-001: component without an id.
struct MissingIdRule;

impl ContractRule for MissingIdRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        input
            .components()
            .into_iter()
            .filter(|(_, component)| component.id().trim().is_empty())
            .map(|(step_id, component)| {
                LintResult::new(
                    "PUB-LINT-001",
                    LintSeverity::Error,
                    format!("{} component in step '{}' has no id", component.kind(), step_id),
                    Some(step_id.to_string()),
                    None,
                )
            })
            .collect()
    }
}

/// PUB-LINT-002: storage key is not lowercase kebab-case.
struct StorageKeyFormatRule;

impl ContractRule for StorageKeyFormatRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut out = Vec::new();
        for (step_id, component) in input.components() {
            let Some(key) = component.storage_key() else {
                continue;
            };
            if !is_kebab_key(key) {
                out.push(LintResult::new(
                    "PUB-LINT-002",
                    LintSeverity::Error,
                    format!("storage key '{}' is not lowercase kebab-case", key),
                    location(step_id, component),
                    Some("use lowercase letters, digits and single hyphens".to_string()),
                ));
            }
        }
        out
    }
}

/// PUB-LINT-003: storage key repeated within a step.
struct DuplicateStorageKeyRule;

impl ContractRule for DuplicateStorageKeyRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        for (step_id, component) in input.components() {
            if let Some(key) = component.storage_key() {
                *counts.entry((step_id, key)).or_insert(0) += 1;
            }
        }

        let mut out = Vec::new();
        for ((step_id, key), count) in counts {
            if count > 1 {
                out.push(LintResult::new(
                    "PUB-LINT-003",
                    LintSeverity::Error,
                    format!(
                        "storage key '{}' used {} times in step '{}'",
                        key, count, step_id
                    ),
                    Some(format!("{}/{}", step_id, key)),
                    Some("give each field a distinct name".to_string()),
                ));
            }
        }
        out
    }
}

/// PUB-LINT-004: choice component without usable options.
struct ChoiceOptionsRule;

impl ContractRule for ChoiceOptionsRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut out = Vec::new();
        for (step_id, component) in input.components() {
            let Some(field) = component.as_field() else {
                continue;
            };
            if !field.kind.is_choice() {
                continue;
            }
            let options = field.options.as_deref().unwrap_or_default();
            if options.is_empty() {
                out.push(LintResult::new(
                    "PUB-LINT-004",
                    LintSeverity::Error,
                    format!("{} '{}' has no options", field.kind, field.id),
                    location(step_id, component),
                    Some("add at least one item with text and value".to_string()),
                ));
                continue;
            }
            for (index, option) in options.iter().enumerate() {
                let empty_value = match &option.value {
                    Value::Null => true,
                    Value::String(text) => text.trim().is_empty(),
                    _ => false,
                };
                if option.label.is_empty() || empty_value {
                    out.push(LintResult::new(
                        "PUB-LINT-004",
                        LintSeverity::Error,
                        format!(
                            "option {} of '{}' is missing a label or value",
                            index + 1,
                            field.id
                        ),
                        location(step_id, component),
                        None,
                    ));
                }
            }
        }
        out
    }
}

/// PUB-LINT-005: summary list without rows, or a row without a key.
struct SummaryListRowsRule;

impl ContractRule for SummaryListRowsRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut out = Vec::new();
        for (step_id, component) in input.components() {
            let NormalizedComponent::SummaryList(list) = component else {
                continue;
            };
            if list.rows.is_empty() {
                out.push(LintResult::new(
                    "PUB-LINT-005",
                    LintSeverity::Error,
                    format!("summary list '{}' has no rows", list.id),
                    location(step_id, component),
                    Some("include at least one field in the summary".to_string()),
                ));
            }
            if list.rows.iter().any(|row| row.key.trim().is_empty()) {
                out.push(LintResult::new(
                    "PUB-LINT-005",
                    LintSeverity::Error,
                    format!("summary list '{}' has a row without a key", list.id),
                    location(step_id, component),
                    None,
                ));
            }
        }
        out
    }
}

/// PUB-LINT-006: step not reachable from the start step.
struct UnreachableStepRule;

impl ContractRule for UnreachableStepRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        input
            .routing
            .unreachable()
            .iter()
            .map(|step_id| {
                let slug = input
                    .routing
                    .slug(*step_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| step_id.to_string());
                LintResult::new(
                    "PUB-LINT-006",
                    LintSeverity::Warning,
                    format!("step '{}' is unreachable from the start step", slug),
                    Some(slug),
                    Some("route to the step from a reachable step or remove it".to_string()),
                )
            })
            .collect()
    }
}

/// PUB-LINT-007: route edge to a step outside the workflow was dropped.
struct DroppedRouteEdgeRule;

impl ContractRule for DroppedRouteEdgeRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        input
            .routing
            .dropped_edges()
            .iter()
            .map(|edge| {
                let source = input
                    .routing
                    .slug(edge.source_step_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| edge.source_step_id.to_string());
                let via = edge
                    .option_value
                    .as_ref()
                    .map(|value| format!(" (option '{}')", value))
                    .unwrap_or_default();
                LintResult::new(
                    "PUB-LINT-007",
                    LintSeverity::Warning,
                    format!(
                        "route from '{}'{} targets step {} which is not in this workflow",
                        source, via, edge.target_step_id
                    ),
                    Some(source),
                    Some("add the step to the workflow or repoint the route".to_string()),
                )
            })
            .collect()
    }
}

/// PUB-LINT-008: option still carries an unresolved conditional child marker.
struct UnresolvedConditionalChildRule;

impl ContractRule for UnresolvedConditionalChildRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut out = Vec::new();
        for (step_id, component) in input.components() {
            let Some(field) = component.as_field() else {
                continue;
            };
            for option in field.options.iter().flatten() {
                if let Some(marker) = &option.conditional_child_id {
                    out.push(LintResult::new(
                        "PUB-LINT-008",
                        LintSeverity::Warning,
                        format!(
                            "option of '{}' reveals '{}' which was not embedded",
                            field.id, marker
                        ),
                        location(step_id, component),
                        Some("point conditionalChildId at a component id or name in the same step".to_string()),
                    ));
                }
            }
        }
        out
    }
}
