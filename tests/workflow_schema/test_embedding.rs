use intake_publisher::core::workflow_schema::audit::MiniJinjaRenderer;
use intake_publisher::core::workflow_schema::store::{AuthoringSnapshot, SnapshotStore};
use intake_publisher::core::workflow_schema::{build_workflow_schema, BuildOptions};
use serde_json::{json, Value};

/// One-step workflow whose components are the given override objects, all
/// placed from templates of the matching type.
fn single_step(components: Vec<(&str, Value)>) -> SnapshotStore {
    let templates: Vec<Value> = components
        .iter()
        .enumerate()
        .map(|(index, (kind, _))| {
            json!({"id": 100 + index, "template_key": kind, "version": 1, "type": kind, "default_props": {}})
        })
        .collect();
    let placements: Vec<Value> = components
        .iter()
        .enumerate()
        .map(|(index, (_, overrides))| {
            json!({"step_id": 1, "position": index + 1, "template_id": 100 + index, "props_overrides": overrides})
        })
        .collect();
    let snapshot: AuthoringSnapshot = serde_json::from_value(json!({
        "workflows": [{"id": 1, "name": "Embedding", "status": "active"}],
        "steps": [{"id": 1, "name": "Household"}],
        "workflow_steps": [{"workflow_id": 1, "step_id": 1, "is_start": true}],
        "templates": templates,
        "step_components": placements
    }))
    .unwrap();
    SnapshotStore::new(snapshot)
}

fn build(store: &SnapshotStore) -> (Vec<Value>, Vec<String>) {
    let output =
        build_workflow_schema(store, 1, &BuildOptions::default(), &MiniJinjaRenderer::default())
            .unwrap();
    let codes = output.lint().into_iter().map(|lint| lint.code).collect();
    let components = output.schema.steps[0]
        .components
        .iter()
        .map(|component| serde_json::to_value(component).unwrap())
        .collect();
    (components, codes)
}

#[test]
fn checkbox_options_collect_children_by_name() {
    let store = single_step(vec![
        (
            "checkboxes",
            json!({"name": "benefits", "items": [
                {"text": "Housing", "value": "housing", "conditionalChildId": "rent"},
                {"text": "Food", "value": "food", "conditionalChildId": "grocery"}
            ]}),
        ),
        ("number", json!({"name": "rent", "label": {"text": "Monthly rent"}})),
        ("number", json!({"id": "grocery", "label": {"text": "Groceries"}})),
        ("textarea", json!({"name": "notes"})),
    ]);
    let (components, codes) = build(&store);
    let top: Vec<&str> = components.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(top, vec!["benefits", "notes"]);
    assert_eq!(components[0]["options"][0]["children"][0]["storageKey"], json!("rent"));
    assert_eq!(components[0]["options"][1]["children"][0]["storageKey"], json!("grocery"));
    assert!(codes.is_empty());
}

#[test]
fn unresolved_marker_is_kept_and_linted() {
    let store = single_step(vec![(
        "radio",
        json!({"name": "pets", "items": [{"text": "Yes", "value": "yes", "conditionalChildId": "pet-name"}]}),
    )]);
    let (components, codes) = build(&store);
    assert_eq!(components[0]["options"][0]["conditionalChildId"], json!("pet-name"));
    assert_eq!(codes, vec!["PUB-LINT-008"]);
}

#[test]
fn children_keep_their_normalized_shape() {
    let store = single_step(vec![
        (
            "radio",
            json!({"name": "employed", "items": [
                {"text": "Yes", "value": "yes", "conditionalChildId": "employer"},
                {"text": "No", "value": "no"}
            ]}),
        ),
        (
            "input",
            json!({"name": "employer", "label": {"text": "Employer"}, "validation": {"required": true}}),
        ),
    ]);
    let (components, _) = build(&store);
    assert_eq!(components.len(), 1);
    let child = &components[0]["options"][0]["children"][0];
    assert_eq!(child["type"], json!("input"));
    assert_eq!(child["required"], json!(true));
    assert_eq!(child["label"], json!({"en": "Employer", "fr": "Employer"}));
    assert!(components[0]["options"][1].get("children").is_none());
}
