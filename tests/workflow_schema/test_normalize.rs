use intake_publisher::core::error::codes;
use intake_publisher::core::workflow_schema::normalize::{
    normalize_step, NormalizeOptions, RunRegistry, StepComponents, StepInput,
};
use intake_publisher::core::workflow_schema::routing::StepRoute;
use intake_publisher::core::workflow_schema::store::PlacedComponent;
use intake_types::ComponentTemplateRow;
use serde_json::{json, Value};

fn placed(position: i64, kind: &str, defaults: Value, overrides: Value) -> PlacedComponent {
    PlacedComponent {
        position,
        template: ComponentTemplateRow {
            id: position,
            template_key: kind.to_string(),
            version: 1,
            component_type: kind.to_string(),
            default_props: defaults,
            render_source: None,
            status: None,
        },
        overrides,
    }
}

fn normalize(placed: &[PlacedComponent], route: Option<&StepRoute>) -> StepComponents {
    let mut registry = RunRegistry::new();
    normalize_with(placed, route, &mut registry)
}

fn normalize_with(
    placed: &[PlacedComponent],
    route: Option<&StepRoute>,
    registry: &mut RunRegistry,
) -> StepComponents {
    let step = StepInput {
        step_id: 1,
        step_name: "Contact",
        route,
    };
    normalize_step(&step, placed, &NormalizeOptions::default(), registry).unwrap()
}

fn to_json(step: &StepComponents) -> Value {
    serde_json::to_value(&step.components).unwrap()
}

#[test]
fn instance_overrides_merge_over_template_defaults() {
    let components = vec![placed(
        1,
        "input",
        json!({"name": "input", "label": {"text": "Field", "classes": "govuk-label"}, "autocomplete": "off"}),
        json!({"name": "email_address", "label": {"text": {"en": "Email", "fr": "Courriel"}}, "autocomplete": null}),
    )];
    let out = to_json(&normalize(&components, None));
    let field = &out[0];
    assert_eq!(field["storageKey"], json!("email-address"));
    assert_eq!(field["label"], json!({"en": "Email", "fr": "Courriel"}));
    assert_eq!(field["labelClass"], json!("govuk-label"));
    assert_eq!(field["autocomplete"], json!("off"));
    assert_eq!(field["normalize"], json!("trim"));
}

#[test]
fn placeholder_names_fall_through_to_label_slug() {
    let components = vec![
        placed(1, "input", json!({"name": "first-name", "label": {"text": "Given name"}}), json!({})),
        placed(2, "input", json!({"id": "field"}), json!({})),
    ];
    let out = to_json(&normalize(&components, None));
    assert_eq!(out[0]["storageKey"], json!("given-name"));
    assert_eq!(out[1]["storageKey"], json!("input-2"));
    assert_eq!(out[1]["label"], json!({"en": "input-2", "fr": "input-2"}));
}

#[test]
fn route_key_wins_for_the_keyed_instance_only() {
    let route = StepRoute::ByOption {
        field_key: "contact_method".to_string(),
        options: vec![("email".to_string(), 2)],
        default_next: None,
    };
    let components = vec![
        placed(1, "radio", json!({"name": "example-radio", "items": [{"text": "Email", "value": "email"}]}), json!({})),
        placed(2, "input", json!({"name": "urgency"}), json!({})),
    ];
    let step = normalize(&components, Some(&route));
    assert_eq!(step.branch_var.as_deref(), Some("contact-method"));
    let out = to_json(&step);
    assert_eq!(out[0]["storageKey"], json!("contact-method"));
    assert_eq!(out[1]["storageKey"], json!("urgency"));
}

#[test]
fn route_field_matches_name_in_slug_form() {
    let route = StepRoute::ByOption {
        field_key: "has_status".to_string(),
        options: vec![("yes".to_string(), 2)],
        default_next: None,
    };
    let components = vec![
        placed(1, "radio", json!({"name": "urgency", "items": [{"text": "High", "value": "high"}]}), json!({})),
        placed(2, "radio", json!({"name": "has-status", "items": [{"text": "Yes", "value": "yes"}]}), json!({})),
    ];
    let step = normalize(&components, Some(&route));
    assert_eq!(step.branch_var.as_deref(), Some("has-status"));
    let out = to_json(&step);
    assert_eq!(out[0]["storageKey"], json!("urgency"));
    assert_eq!(out[1]["storageKey"], json!("has-status"));
}

#[test]
fn placeholder_field_name_uses_label_slug() {
    let components = vec![placed(
        1,
        "radio",
        json!({"fieldName": "radio", "name": "radio-group-1", "label": {"text": "Favourite colour"}, "items": []}),
        json!({}),
    )];
    let out = to_json(&normalize(&components, None));
    assert_eq!(out[0]["storageKey"], json!("favourite-colour"));
    assert_eq!(out[0]["id"], json!("favourite-colour"));
}

#[test]
fn duplicate_names_get_unique_keys_within_a_step() {
    let components = vec![
        placed(1, "input", json!({"name": "phone"}), json!({})),
        placed(2, "input", json!({"name": "phone"}), json!({})),
    ];
    let out = to_json(&normalize(&components, None));
    assert_eq!(out[0]["storageKey"], json!("phone"));
    assert_eq!(out[1]["storageKey"], json!("phone-2"));
    assert_eq!(out[1]["id"], json!("phone-2"));
}

#[test]
fn presentational_components_carry_text_only() {
    let components = vec![
        placed(1, "warning-text", json!({"text": {"en": "Careful", "fr": "Attention"}}), json!({})),
        placed(2, "paragraph", json!({"text": "Hello", "classes": "lead"}), json!({})),
    ];
    let out = to_json(&normalize(&components, None));
    assert_eq!(
        out[0],
        json!({"id": "warning-text", "type": "warning-text", "text": {"en": "Careful", "fr": "Attention"}})
    );
    assert_eq!(out[1]["class"], json!("lead"));
    assert!(out[1].get("storageKey").is_none());
}

#[test]
fn numeric_choice_values_are_not_coerced() {
    let components = vec![placed(
        1,
        "select",
        json!({"name": "household", "items": [{"text": "One", "value": "1"}, {"text": "Two", "value": 2}]}),
        json!({}),
    )];
    let out = to_json(&normalize(&components, None));
    assert_eq!(out[0]["options"][0]["value"], json!("1"));
    assert_eq!(out[0]["options"][1]["value"], json!(2));
    assert_eq!(out[0]["normalize"], json!("none"));
}

#[test]
fn validation_rules_are_sanitized() {
    let components = vec![placed(
        1,
        "input",
        json!({"name": "postal"}),
        json!({"validation": {
            "required": false,
            "requiredMessage": "ignored",
            "rules": [
                {"type": "pattern", "pattern": "^[A-Z]\\d[A-Z]", "message": "Bad code", "trigger": "blur"},
                {"type": "pattern"},
                {"type": "mystery"}
            ]
        }}),
    )];
    let out = to_json(&normalize(&components, None));
    let validation = &out[0]["validation"];
    assert!(validation.get("requiredMessage").is_none());
    let rules = validation["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["trigger"], json!(["blur"]));
    assert_eq!(out[0]["required"], json!(false));
}

#[test]
fn summary_list_uses_run_wide_aliases() {
    let mut registry = RunRegistry::new();
    normalize_with(
        &[placed(1, "input", json!({"name": "given_name", "label": {"text": "Given name"}}), json!({}))],
        None,
        &mut registry,
    );
    let summary = normalize_with(
        &[placed(
            1,
            "summary-list",
            json!({"included": [{"key": "given_name"}, {"key": "unknown", "labelEn": "Other"}], "hideEmpty": false}),
            json!({}),
        )],
        None,
        &mut registry,
    );
    let out = to_json(&summary);
    assert_eq!(out[0]["rows"][0]["key"], json!("given-name"));
    assert_eq!(out[0]["rows"][0]["originalKey"], json!("given_name"));
    assert_eq!(out[0]["rows"][0]["label"], json!({"en": "Given name", "fr": "Given name"}));
    assert_eq!(out[0]["rows"][1]["label"], json!({"en": "Other", "fr": "Other"}));
    assert_eq!(out[0]["hideEmpty"], json!(false));
}

#[test]
fn unsupported_type_reports_step_and_position() {
    let components = vec![
        placed(1, "input", json!({"name": "ok"}), json!({})),
        placed(2, "carousel", json!({}), json!({})),
    ];
    let step = StepInput {
        step_id: 9,
        step_name: "Gallery",
        route: None,
    };
    let err = normalize_step(
        &step,
        &components,
        &NormalizeOptions::default(),
        &mut RunRegistry::new(),
    )
    .unwrap_err();
    assert!(err.is(codes::UNSUPPORTED_COMPONENT_TYPE));
    let details = err.details.unwrap();
    assert_eq!(details["position"], json!(2));
    assert_eq!(details["type"], json!("carousel"));
    assert_eq!(details["step"], json!("Gallery"));
}

#[test]
fn type_aliases_are_accepted() {
    let components = vec![
        placed(1, "radios", json!({"name": "a", "items": [{"text": "Yes", "value": "yes"}, {"text": "No", "value": "no"}]}), json!({})),
        placed(2, "checkbox", json!({"name": "b", "items": [{"text": "X", "value": "x"}]}), json!({})),
    ];
    let out = to_json(&normalize(&components, None));
    assert_eq!(out[0]["type"], json!("radio"));
    assert_eq!(out[0]["normalize"], json!("yn-01"));
    assert_eq!(out[1]["type"], json!("checkboxes"));
}
