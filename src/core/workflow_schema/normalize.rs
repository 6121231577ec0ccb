#![allow(clippy::result_large_err)] // Unsupported types abort the publish with a structured AppError.

use super::component_type::ComponentType;
use super::i18n::LocalizedText;
use super::props::{is_truthy, scalar_text, Props};
use super::routing::StepRoute;
use super::slug::{slugify, IdentifierSet};
use super::store::PlacedComponent;
use super::validation::{sanitize_validation, SanitizedValidation};
use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use intake_types::RowId;
use serde::Serialize;
use serde_json::{json, Number, Value};
use std::collections::{HashMap, HashSet};

/// Authoring ids copied from template examples; never used as storage keys.
pub const DEFAULT_PLACEHOLDER_NAMES: &[&str] = &[
    "example-radio",
    "first-name",
    "last-name",
    "input",
    "text-input",
    "field",
    "checkboxes",
    "radio",
];

/// Input masks the renderer knows how to apply.
const KNOWN_MASKS: &[&str] = &[
    "phone-na",
    "sin-ca",
    "postal-code-ca",
    "postal-code-us",
    "date-iso",
    "time-hm",
    "currency",
];

const LABEL_PATHS: &[&[&str]] = &[&["fieldset", "legend", "text"], &["label", "text"], &["titleText"]];
const HINT_PATHS: &[&[&str]] = &[&["hint", "text"], &["text"]];

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    placeholder_names: HashSet<String>,
}

impl NormalizeOptions {
    pub fn with_placeholders<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            placeholder_names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_placeholder(&self, candidate: &str) -> bool {
        self.placeholder_names
            .contains(&candidate.trim().to_ascii_lowercase())
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::with_placeholders(DEFAULT_PLACEHOLDER_NAMES)
    }
}

/// Identifier maps shared by every step of one publish run.
#[derive(Debug, Default)]
pub struct RunRegistry {
    aliases: HashMap<String, String>,
    labels: HashMap<String, LocalizedText>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage key registered for an authoring alias. First registration wins.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn label_for(&self, storage_key: &str) -> Option<&LocalizedText> {
        self.labels.get(storage_key)
    }

    fn register(&mut self, aliases: &[&str], field: &FieldComponent) {
        for alias in aliases.iter().filter(|alias| !alias.is_empty()) {
            self.aliases
                .entry(alias.to_string())
                .or_insert_with(|| field.storage_key.clone());
        }
        self.aliases
            .entry(field.storage_key.clone())
            .or_insert_with(|| field.storage_key.clone());
        self.labels
            .entry(field.storage_key.clone())
            .or_insert_with(|| field.label.clone());
    }
}

/// Value normalisation the runtime applies before evaluating predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NormalizeHint {
    #[serde(rename = "date-iso")]
    DateIso,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "trim")]
    Trim,
    #[serde(rename = "yn-01")]
    YesNo,
    #[serde(rename = "none")]
    None,
}

impl NormalizeHint {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date-iso" => Some(NormalizeHint::DateIso),
            "number" => Some(NormalizeHint::Number),
            "trim" => Some(NormalizeHint::Trim),
            "yn-01" => Some(NormalizeHint::YesNo),
            "none" => Some(NormalizeHint::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedComponent {
    Text(TextBlock),
    SummaryList(SummaryList),
    Field(Box<FieldComponent>),
}

impl NormalizedComponent {
    pub fn id(&self) -> &str {
        match self {
            NormalizedComponent::Text(block) => &block.id,
            NormalizedComponent::SummaryList(list) => &list.id,
            NormalizedComponent::Field(field) => &field.id,
        }
    }

    pub fn kind(&self) -> ComponentType {
        match self {
            NormalizedComponent::Text(block) => block.kind,
            NormalizedComponent::SummaryList(_) => ComponentType::SummaryList,
            NormalizedComponent::Field(field) => field.kind,
        }
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.as_field().map(|field| field.storage_key.as_str())
    }

    pub fn as_field(&self) -> Option<&FieldComponent> {
        match self {
            NormalizedComponent::Field(field) => Some(&**field),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FieldComponent> {
        match self {
            NormalizedComponent::Field(field) => Some(&mut **field),
            _ => None,
        }
    }
}

/// Static text, inset or warning callout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub text: LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryList {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub rows: Vec<SummaryRow>,
    pub hide_empty: bool,
    pub empty_fallback: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub key: String,
    pub label: LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub label: LocalizedText,
    /// Authored value, never coerced.
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_child_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NormalizedComponent>>,
}

/// Data-collecting component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub label: LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_class: Option<String>,
    pub required: bool,
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
    pub normalize: NormalizeHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<SanitizedValidation>,
    #[serde(flatten)]
    pub details: FieldDetails,
}

/// Type-specific fields, flattened into the component object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldDetails {
    Input(InputDetails),
    CharacterCount(CharacterCountDetails),
    Date(DateDetails),
    FileUpload(FileUploadDetails),
    Signature(SignatureDetails),
    Plain {},
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spellcheck: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Affix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<Affix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_described_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_group_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Affix {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterCountDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_fields: Option<Vec<DateField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_mime_list: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_max_size: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<VisibilityConditions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityConditions {
    pub all: Vec<VisibilityCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityCondition {
    #[serde(rename = "ref")]
    pub reference: String,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDetails {
    pub action_label: LocalizedText,
    pub clear_label: LocalizedText,
    pub placeholder: LocalizedText,
    pub status_signed_text: LocalizedText,
    pub status_unsigned_text: LocalizedText,
    pub box_padding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handwriting_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_group_class: Option<String>,
}

type DetailExtractor = fn(Props<'_>) -> FieldDetails;

const DETAIL_EXTRACTORS: &[(ComponentType, DetailExtractor)] = &[
    (ComponentType::Input, input_details),
    (ComponentType::CharacterCount, character_count_details),
    (ComponentType::Date, date_details),
    (ComponentType::DateInput, date_details),
    (ComponentType::FileUpload, file_upload_details),
    (ComponentType::SignatureAck, signature_details),
];

/// Step being normalized.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub step_id: RowId,
    pub step_name: &'a str,
    pub route: Option<&'a StepRoute>,
}

/// Normalized components of one step, before conditional embedding.
#[derive(Debug, Clone, Default)]
pub struct StepComponents {
    pub components: Vec<NormalizedComponent>,
    /// Original authoring `id` / `name` to position in `components`.
    pub authoring_index: HashMap<String, usize>,
    /// Storage key of the component the step's `by_option` route keys on.
    pub branch_var: Option<String>,
}

/// Normalize every component instance of a step.
///
/// Fails with `PUB-TYPE-001` on the first instance whose type is not supported.
pub fn normalize_step(
    step: &StepInput<'_>,
    placed: &[PlacedComponent],
    options: &NormalizeOptions,
    registry: &mut RunRegistry,
) -> Result<StepComponents, AppError> {
    let merged: Vec<Value> = placed.iter().map(PlacedComponent::merged_props).collect();
    let kinds = placed
        .iter()
        .enumerate()
        .map(|(index, component)| {
            ComponentType::classify_template(
                &component.template.template_key,
                &component.template.component_type,
            )
            .ok_or_else(|| unsupported_type(step, index, component))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let route_field = step.route.and_then(StepRoute::field_key);
    let keyed = route_field.and_then(|field| keyed_instance(field, &merged, &kinds));

    let mut out = StepComponents::default();
    let mut dom_ids = IdentifierSet::new();
    let mut storage_ids = IdentifierSet::new();

    for (index, (kind, raw)) in kinds.iter().copied().zip(&merged).enumerate() {
        let props = Props::new(raw);
        if kind.is_presentational() {
            out.components
                .push(NormalizedComponent::Text(text_block(kind, props, &mut dom_ids)));
            continue;
        }
        if kind == ComponentType::SummaryList {
            out.components.push(NormalizedComponent::SummaryList(summary_list(
                props,
                &mut dom_ids,
                registry,
            )));
            continue;
        }

        let route_key = if keyed == Some(index) { route_field } else { None };
        let (field, label_slug) = field_component(
            index,
            kind,
            props,
            route_key,
            options,
            &mut dom_ids,
            &mut storage_ids,
        );
        tracing::debug!(
            step_id = step.step_id,
            position = index + 1,
            id = %field.id,
            storage_key = %field.storage_key,
            "normalized component"
        );
        if route_key.is_some() {
            out.branch_var = Some(field.storage_key.clone());
        }

        let authoring_id = props.text("id");
        let name = props.text("name");
        let field_name = props.text_any(&["fieldName", "field_name", "fieldname"]);
        let aliases: Vec<&str> = [authoring_id.as_deref(), name.as_deref(), field_name.as_deref()]
            .into_iter()
            .flatten()
            .chain(std::iter::once(label_slug.as_str()))
            .collect();
        registry.register(&aliases, &field);

        let position = out.components.len();
        if let Some(authoring_id) = authoring_id {
            out.authoring_index.insert(authoring_id, position);
        }
        if let Some(name) = name {
            out.authoring_index.entry(name).or_insert(position);
        }
        out.components.push(NormalizedComponent::Field(Box::new(field)));
    }

    Ok(out)
}

fn unsupported_type(step: &StepInput<'_>, index: usize, component: &PlacedComponent) -> AppError {
    let raw_type = component.template.component_type.trim().to_ascii_lowercase();
    AppError::new(
        ErrorCategory::ValidationError,
        format!(
            "Unsupported component type: '{}' (template_key={})",
            raw_type, component.template.template_key
        ),
    )
    .with_code(codes::UNSUPPORTED_COMPONENT_TYPE)
    .with_context("step", step.step_name)
    .with_details(json!({
        "step": step.step_name,
        "step_id": step.step_id,
        "position": index + 1,
        "template_key": component.template.template_key,
        "type": raw_type,
    }))
}

/// Instance a `by_option` route keys on.
///
/// Names are compared in slug form, so `has_status` matches `has-status`.
/// Without a name match the step's only choice component is used; a step
/// with several choice components and no match has no keyed instance.
fn keyed_instance(field: &str, merged: &[Value], kinds: &[ComponentType]) -> Option<usize> {
    let is_field = |kind: &ComponentType| {
        !kind.is_presentational() && *kind != ComponentType::SummaryList
    };
    let wanted = slugify(field);
    let named = merged.iter().zip(kinds).position(|(raw, kind)| {
        let props = Props::new(raw);
        is_field(kind)
            && !wanted.is_empty()
            && ["fieldName", "field_name", "fieldname", "name", "id"]
                .iter()
                .any(|key| props.text(key).is_some_and(|value| slugify(&value) == wanted))
    });
    named.or_else(|| {
        let mut choices = kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.is_choice())
            .map(|(index, _)| index);
        match (choices.next(), choices.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    })
}

fn text_block(kind: ComponentType, props: Props<'_>, dom_ids: &mut IdentifierSet) -> TextBlock {
    let label = props.first_path(LABEL_PATHS);
    let source = match kind {
        ComponentType::Paragraph => props.get("text").or(label),
        _ => props
            .get("text")
            .or_else(|| props.path(&["hint", "text"]))
            .or(label),
    };
    TextBlock {
        id: dom_ids.claim(kind.as_str()),
        kind,
        text: source.map(LocalizedText::resolve).unwrap_or_default(),
        class: if kind == ComponentType::Paragraph {
            props.text("classes")
        } else {
            None
        },
    }
}

fn summary_list(
    props: Props<'_>,
    dom_ids: &mut IdentifierSet,
    registry: &RunRegistry,
) -> SummaryList {
    let mut rows = Vec::new();
    for entry in props.array("included") {
        let row = Props::new(entry);
        let Some(key) = row.text("key") else {
            continue;
        };
        let resolved = registry.resolve_alias(&key).unwrap_or(&key).to_string();
        let base = registry
            .label_for(&resolved)
            .or_else(|| registry.label_for(&key))
            .cloned()
            .unwrap_or_else(|| {
                let snapshot = LocalizedText::resolve(&json!({
                    "en": row.get("labelEn"),
                    "fr": row.get("labelFr"),
                }));
                if snapshot.is_empty() {
                    LocalizedText::uniform(key.as_str())
                } else {
                    snapshot
                }
            });
        let label = row
            .get("labelOverride")
            .filter(|value| value.is_object())
            .map(LocalizedText::resolve)
            .filter(|text| !text.is_empty())
            .unwrap_or(base);
        if resolved != key {
            tracing::debug!(key = %key, resolved = %resolved, "summary row key resolved through alias");
        }
        rows.push(SummaryRow {
            original_key: (resolved != key).then(|| key.clone()),
            key: resolved,
            label,
        });
    }

    SummaryList {
        id: dom_ids.claim(ComponentType::SummaryList.as_str()),
        kind: ComponentType::SummaryList,
        rows,
        hide_empty: props.get("hideEmpty") != Some(&Value::Bool(false)),
        empty_fallback: props
            .get("emptyFallback")
            .filter(|value| value.is_object())
            .map(LocalizedText::resolve)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| LocalizedText::new("Not provided", "Non fourni")),
    }
}

/// Build a data-collecting component. Returns the component and its label slug.
fn field_component(
    index: usize,
    kind: ComponentType,
    props: Props<'_>,
    route_key: Option<&str>,
    options: &NormalizeOptions,
    dom_ids: &mut IdentifierSet,
    storage_ids: &mut IdentifierSet,
) -> (FieldComponent, String) {
    let label = props
        .first_path(LABEL_PATHS)
        .map(LocalizedText::resolve)
        .unwrap_or_default();
    let hint = props
        .first_path(HINT_PATHS)
        .map(LocalizedText::resolve)
        .unwrap_or_default();

    let position_fallback = format!("{}-{}", kind, index + 1);
    let label_slug = Some(slugify(&label.en))
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| position_fallback.clone());

    let chosen = route_key
        .map(str::to_string)
        .or_else(|| props.text_any(&["fieldName", "field_name", "fieldname"]))
        .or_else(|| props.text("name"))
        .or_else(|| props.text("id").filter(|id| !options.is_placeholder(id)))
        .filter(|key| !options.is_placeholder(key))
        .unwrap_or_else(|| label_slug.clone());

    let id = dom_ids.claim_slug(&chosen, &position_fallback);
    let storage_key = storage_ids.claim_slug(&chosen, &position_fallback);

    let choices = kind
        .is_choice()
        .then(|| props.array("items").iter().map(choice_option).collect::<Vec<_>>());

    let validation_source = props.get("validation").filter(|value| value.is_object());
    let required = match validation_source {
        Some(validation) => validation.get("required").is_some_and(is_truthy),
        None => props.truthy("required"),
    };
    let validation = validation_source.and_then(sanitize_validation);

    let (name, id_prefix) = if kind.reveals_children() {
        (props.text("name"), props.text_any(&["idPrefix", "id_prefix"]))
    } else {
        (None, None)
    };

    let normalize = props
        .text("normalize")
        .and_then(|raw| NormalizeHint::parse(&raw))
        .filter(|hint| *hint != NormalizeHint::None)
        .unwrap_or_else(|| infer_normalize(kind, props, choices.as_deref()));

    let field = FieldComponent {
        label: label.or_fallback(&id),
        hint: if hint.is_empty() { None } else { Some(hint) },
        class: props.text("classes"),
        label_class: props.path_text(&["label", "classes"]),
        legend_class: props.path_text(&["fieldset", "legend", "classes"]),
        required: required || validation.as_ref().is_some_and(SanitizedValidation::is_required),
        storage_key,
        name,
        id_prefix,
        options: choices,
        normalize,
        validation,
        details: extract_details(kind, props),
        id,
        kind,
    };
    (field, label_slug)
}

fn choice_option(item: &Value) -> ChoiceOption {
    let item = Props::new(item);
    let text_source = item.get("text").or_else(|| item.get("html"));
    let raw_value = item.get("value");
    let label = match text_source {
        Some(source) => LocalizedText::resolve(source),
        None => raw_value
            .and_then(scalar_text)
            .map(LocalizedText::uniform)
            .unwrap_or_default(),
    };
    let value = match (raw_value, text_source) {
        (Some(value), _) => value.clone(),
        (None, Some(Value::String(text))) => Value::String(text.clone()),
        (None, _) => Value::String(label.en.clone()),
    };
    let hint = item
        .first_path(&[&["hint", "text"], &["hint", "html"], &["hint"]])
        .map(LocalizedText::resolve)
        .filter(|hint| !hint.is_empty());
    ChoiceOption {
        label,
        value,
        id: item.text("id"),
        hint,
        conditional_child_id: item.text("conditionalChildId"),
        children: None,
    }
}

/// Infer the runtime normalisation. Numeric-looking choice values are never
/// coerced; only an all yes/no option set maps to `yn-01`.
fn infer_normalize(
    kind: ComponentType,
    props: Props<'_>,
    choices: Option<&[ChoiceOption]>,
) -> NormalizeHint {
    match kind {
        ComponentType::Date | ComponentType::DateInput => NormalizeHint::DateIso,
        ComponentType::Number => NormalizeHint::Number,
        ComponentType::Input => {
            let html_type = props.text("type").map(|raw| raw.to_ascii_lowercase());
            if html_type.as_deref() == Some("number") {
                NormalizeHint::Number
            } else {
                NormalizeHint::Trim
            }
        }
        ComponentType::Text | ComponentType::Textarea => NormalizeHint::Trim,
        ComponentType::Radio | ComponentType::Select => match choices {
            Some(choices) if !choices.is_empty() && choices.iter().all(is_yes_no) => {
                NormalizeHint::YesNo
            }
            _ => NormalizeHint::None,
        },
        _ => NormalizeHint::None,
    }
}

fn is_yes_no(option: &ChoiceOption) -> bool {
    scalar_text(&option.value)
        .map(|value| value.to_ascii_lowercase())
        .is_some_and(|value| matches!(value.as_str(), "yes" | "no" | "true" | "false"))
}

fn extract_details(kind: ComponentType, props: Props<'_>) -> FieldDetails {
    DETAIL_EXTRACTORS
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, extract)| extract(props))
        .unwrap_or(FieldDetails::Plain {})
}

fn input_details(props: Props<'_>) -> FieldDetails {
    FieldDetails::Input(InputDetails {
        input_type: props.text("type"),
        autocomplete: props.text("autocomplete"),
        input_mode: props.text_any(&["inputmode", "inputMode"]),
        pattern: props.text("pattern"),
        spellcheck: props.flag("spellcheck"),
        disabled: props.flag("disabled"),
        prefix: affix(props.get("prefix")),
        suffix: affix(props.get("suffix")),
        extra_described_by: props.text_any(&["describedBy", "describedby"]),
        form_group_class: props.path_text(&["formGroup", "classes"]),
        mask: input_mask(props),
    })
}

fn affix(value: Option<&Value>) -> Option<Affix> {
    let affix = Props::new(value?);
    Some(Affix {
        text: affix.text_any(&["text", "html"])?,
        classes: affix.text("classes"),
    })
}

fn input_mask(props: Props<'_>) -> Option<String> {
    if let Some(mask) = props.text("mask") {
        let mask = mask.to_ascii_lowercase();
        if mask == "sin" {
            return Some("sin-ca".to_string());
        }
        if !KNOWN_MASKS.contains(&mask.as_str()) {
            tracing::debug!(mask = %mask, "emitting unrecognised input mask");
        }
        return Some(mask);
    }
    props.text("inputMask").map(|mask| mask.to_ascii_lowercase())
}

fn character_count_details(props: Props<'_>) -> FieldDetails {
    FieldDetails::CharacterCount(CharacterCountDetails {
        max_length: props.number_where(&["maxlength", "maxLength"], |n| n > 0.0),
        threshold: props.number_where(&["threshold"], |n| n >= 0.0),
        rows: props.number_where(&["rows"], |n| n > 0.0),
    })
}

fn date_details(props: Props<'_>) -> FieldDetails {
    FieldDetails::Date(DateDetails {
        name_prefix: props.text("namePrefix"),
        date_fields: props.get("items").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let item = Props::new(item);
                    Some(DateField {
                        name: item.text("name")?,
                        classes: item.text("classes"),
                    })
                })
                .collect()
        }),
    })
}

fn file_upload_details(props: Props<'_>) -> FieldDetails {
    let conditions = props
        .path(&["conditions", "all"])
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter_map(|rule| {
                    let rule = Props::new(rule);
                    let op = rule.text("op")?;
                    let value = if matches!(op.as_str(), "exists" | "notExists") {
                        None
                    } else {
                        rule.get("value").and_then(scalar_text)
                    };
                    Some(VisibilityCondition {
                        reference: rule.text("ref")?,
                        op,
                        value,
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|all| !all.is_empty())
        .map(|all| VisibilityConditions { all });

    FieldDetails::FileUpload(FileUploadDetails {
        multiple: props.flag("multiple"),
        accept: props.text("accept"),
        max_size_mb: props.number_where(&["maxSizeMb"], |n| n > 0.0),
        document_type: props.text("documentType"),
        show_mime_list: props.flag("showMimeList"),
        show_max_size: props.flag("showMaxSize"),
        disabled: props.flag("disabled"),
        conditions,
    })
}

fn signature_details(props: Props<'_>) -> FieldDetails {
    FieldDetails::Signature(SignatureDetails {
        action_label: LocalizedText::resolve_or(props.get("actionLabel"), "Sign Now"),
        clear_label: LocalizedText::resolve_or(props.get("clearLabel"), "Clear"),
        placeholder: LocalizedText::resolve_or(props.get("placeholder"), "Type your full name"),
        status_signed_text: LocalizedText::resolve_or(props.get("statusSignedText"), "Signed"),
        status_unsigned_text: LocalizedText::resolve_or(
            props.get("statusUnsignedText"),
            "Not signed",
        ),
        box_padding: props
            .text("boxPadding")
            .unwrap_or_else(|| "m".to_string())
            .to_ascii_lowercase(),
        handwriting_font: props.text("handwritingFont"),
        form_group_class: props.path_text(&["formGroup", "classes"]),
    })
}
