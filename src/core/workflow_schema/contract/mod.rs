use super::assemble::PublishedSchema;
use super::normalize::NormalizedComponent;
use super::routing::RoutingPlan;
use serde::Serialize;
use std::fmt;

pub mod rules;
pub use rules::*;

/// Diagnostic severity levels emitted by contract rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

impl LintSeverity {
    fn rank(&self) -> u8 {
        match self {
            LintSeverity::Error => 3,
            LintSeverity::Warning => 2,
            LintSeverity::Info => 1,
        }
    }
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "Error"),
            LintSeverity::Warning => write!(f, "Warning"),
            LintSeverity::Info => write!(f, "Info"),
        }
    }
}

/// Individual diagnostic emitted by a rule.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub code: String,
    pub severity: LintSeverity,
    pub message: String,
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl LintResult {
    /// Create a new lint result with optional location and suggestion.
    pub fn new(
        code: impl Into<String>,
        severity: LintSeverity,
        message: impl Into<String>,
        location: Option<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            location,
            suggestion,
        }
    }
}

/// Built schema plus the routing facts that produced it.
pub struct ContractInput<'a> {
    pub schema: &'a PublishedSchema,
    pub routing: &'a RoutingPlan,
}

impl<'a> ContractInput<'a> {
    /// Every component of every step, nested children included, with its step id.
    pub fn components(&self) -> Vec<(&'a str, &'a NormalizedComponent)> {
        let mut out = Vec::new();
        for step in &self.schema.steps {
            for component in &step.components {
                collect(step.step_id.as_str(), component, &mut out);
            }
        }
        out
    }
}

fn collect<'a>(
    step_id: &'a str,
    component: &'a NormalizedComponent,
    out: &mut Vec<(&'a str, &'a NormalizedComponent)>,
) {
    out.push((step_id, component));
    let Some(options) = component.as_field().and_then(|field| field.options.as_ref()) else {
        return;
    };
    for child in options.iter().filter_map(|option| option.children.as_ref()).flatten() {
        collect(step_id, child, out);
    }
}

/// Trait implemented by schema contract rules.
pub trait ContractRule {
    fn validate(&self, input: &ContractInput<'_>) -> Vec<LintResult>;
}

/// Registry that runs all built-in contract rules.
pub struct ContractRegistry {
    rules: Vec<Box<dyn ContractRule>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self {
            rules: built_in_rules(),
        }
    }

    /// Run all rules. Results are sorted by `(severity desc, code asc, location asc)`.
    pub fn run(&self, input: &ContractInput<'_>) -> Vec<LintResult> {
        let mut results = Vec::new();
        for rule in &self.rules {
            results.extend(rule.validate(input));
        }
        results.sort_by(|a, b| {
            let severity_cmp = b.severity.rank().cmp(&a.severity.rank());
            severity_cmp
                .then(a.code.cmp(&b.code))
                .then(a.location.cmp(&b.location))
        });
        results
    }
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn has_errors(results: &[LintResult]) -> bool {
    results
        .iter()
        .any(|result| result.severity == LintSeverity::Error)
}
