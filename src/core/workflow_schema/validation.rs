use serde::Serialize;
use serde_json::{Map, Value};

/// Rule kinds understood by the runtime validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Pattern,
    Length,
    Range,
    Predicate,
    AtLeastOne,
    Compare,
}

impl RuleKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pattern" => Some(RuleKind::Pattern),
            "length" => Some(RuleKind::Length),
            "range" => Some(RuleKind::Range),
            "predicate" => Some(RuleKind::Predicate),
            "atLeastOne" => Some(RuleKind::AtLeastOne),
            "compare" => Some(RuleKind::Compare),
            _ => None,
        }
    }
}

/// Fields kept for each rule kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleParams {
    Pattern {
        pattern: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<Value>,
    },
    Length {
        #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
        min_length: Option<Value>,
        #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
        max_length: Option<Value>,
    },
    Range {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<Value>,
    },
    Predicate {
        when: Value,
    },
    AtLeastOne {
        fields: Vec<Value>,
    },
    Compare {
        left: Value,
        right: Value,
        op: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Value>,
    pub block: bool,
    #[serde(flatten)]
    pub params: RuleParams,
}

/// Runtime validation contract of one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ValidationRule>>,
}

impl SanitizedValidation {
    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }

    fn has_content(&self) -> bool {
        self.is_required()
            || self
                .required_message
                .as_ref()
                .and_then(Value::as_object)
                .is_some_and(|message| !message.is_empty())
            || self.rules.as_ref().is_some_and(|rules| !rules.is_empty())
    }
}

/// Reduce an authoring validation object to the runtime contract.
///
/// Returns `None` when nothing meaningful survives.
pub fn sanitize_validation(raw: &Value) -> Option<SanitizedValidation> {
    let source = raw.as_object()?;
    let mut out = SanitizedValidation {
        required: source.get("required").and_then(Value::as_bool),
        required_message: message_object(source.get("requiredMessage")),
        error_message: message_object(source.get("errorMessage")),
        rules: None,
    };

    if let Some(rules) = source.get("rules").and_then(Value::as_array) {
        let kept: Vec<ValidationRule> = rules.iter().filter_map(sanitize_rule).collect();
        if kept.len() < rules.len() {
            tracing::warn!(
                dropped = rules.len() - kept.len(),
                "validation rules dropped during sanitization"
            );
        }
        if !kept.is_empty() {
            out.rules = Some(kept);
        }
    }

    if out.required_message.is_none() && out.is_required() {
        out.required_message = out.error_message.clone();
    }
    if !out.is_required() {
        out.required_message = None;
    }

    if out.has_content() {
        Some(out)
    } else {
        None
    }
}

fn sanitize_rule(raw: &Value) -> Option<ValidationRule> {
    let rule = raw.as_object()?;
    let kind_raw = rule
        .get("type")
        .or_else(|| rule.get("kind"))
        .and_then(Value::as_str)?;
    let Some(kind) = RuleKind::parse(kind_raw) else {
        tracing::debug!(kind = kind_raw, "unknown validation rule kind");
        return None;
    };
    let params = rule_params(kind, rule)?;
    Some(ValidationRule {
        id: present(rule.get("id")),
        kind,
        trigger: match rule.get("trigger") {
            Some(Value::Array(items)) => Some(items.clone()),
            Some(Value::Null) | Some(Value::Bool(false)) | None => None,
            Some(Value::String(text)) if text.is_empty() => None,
            Some(other) => Some(vec![other.clone()]),
        },
        message: present(rule.get("message")),
        severity: present(rule.get("severity")),
        block: rule.get("block") != Some(&Value::Bool(false)),
        params,
    })
}

fn rule_params(kind: RuleKind, rule: &Map<String, Value>) -> Option<RuleParams> {
    match kind {
        RuleKind::Pattern => {
            let pattern = truthy(rule.get("pattern"))?;
            Some(RuleParams::Pattern {
                pattern,
                flags: truthy(rule.get("flags")),
            })
        }
        RuleKind::Length => {
            let min_length = present(rule.get("minLength"));
            let max_length = present(rule.get("maxLength"));
            if min_length.is_none() && max_length.is_none() {
                return None;
            }
            Some(RuleParams::Length {
                min_length,
                max_length,
            })
        }
        RuleKind::Range => {
            let min = present(rule.get("min"));
            let max = present(rule.get("max"));
            if min.is_none() && max.is_none() {
                return None;
            }
            Some(RuleParams::Range { min, max })
        }
        // Predicates without a decision clause are inert legacy carryovers.
        RuleKind::Predicate => truthy(rule.get("when")).map(|when| RuleParams::Predicate { when }),
        RuleKind::AtLeastOne => rule
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| RuleParams::AtLeastOne {
                fields: fields.clone(),
            }),
        RuleKind::Compare => Some(RuleParams::Compare {
            left: present(rule.get("left"))?,
            right: present(rule.get("right"))?,
            op: present(rule.get("op"))?,
        }),
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| !value.is_null()).cloned()
}

fn truthy(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        other => Some(other.clone()),
    }
}

fn message_object(value: Option<&Value>) -> Option<Value> {
    value.filter(|value| value.is_object()).cloned()
}
