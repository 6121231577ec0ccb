use intake_publisher::core::error::codes;
use intake_publisher::core::workflow_schema::audit::MiniJinjaRenderer;
use intake_publisher::core::workflow_schema::store::SnapshotStore;
use intake_publisher::core::workflow_schema::{
    build_workflow_schema, publish_workflow, BuildOptions, PublishOptions,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/benefits_snapshot.yaml")
}

fn store() -> SnapshotStore {
    SnapshotStore::load_from_file(&fixture()).unwrap()
}

fn build_json(options: &BuildOptions) -> Value {
    let output =
        build_workflow_schema(&store(), 1, options, &MiniJinjaRenderer::default()).unwrap();
    serde_json::to_value(&output.schema).unwrap()
}

fn publish_options(dir: &Path, strict: bool) -> PublishOptions {
    PublishOptions {
        output_dir: dir.join("public"),
        schema_file: "intakeFormSchema.json".to_string(),
        meta_file: "intakeFormSchema.meta.json".to_string(),
        strict_contract: strict,
    }
}

#[test]
fn steps_follow_routing_order_with_unreachable_last() {
    let schema = build_json(&BuildOptions::default());
    let ids: Vec<&str> = schema["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["stepId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["applicant-details", "children", "review", "orphan"]);
}

#[test]
fn branching_step_keys_on_storage_key() {
    let schema = build_json(&BuildOptions::default());
    let start = &schema["steps"][0];
    assert_eq!(
        start["branching"],
        json!([
            {"condition": {"==": [{"var": "has-children"}, "yes"]}, "nextStepId": "children"},
            {"condition": {"==": [{"var": "has-children"}, "no"]}, "nextStepId": "review"}
        ])
    );
    assert_eq!(start["defaultNextStepId"], json!("review"));
    assert!(start.get("nextStepId").is_none());
    assert_eq!(schema["steps"][1]["nextStepId"], json!("review"));
}

#[test]
fn dropped_edge_leaves_no_next_step() {
    let schema = build_json(&BuildOptions::default());
    let review = &schema["steps"][2];
    assert!(review.get("nextStepId").is_none());
    assert!(review.get("branching").is_none());
    let orphan = &schema["steps"][3];
    assert_eq!(orphan["components"], json!([]));
}

#[test]
fn conditional_child_is_embedded_under_yes_option() {
    let schema = build_json(&BuildOptions::default());
    let components = schema["steps"][0]["components"].as_array().unwrap();
    let ids: Vec<&str> = components.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["paragraph", "full-name", "has-children"]);

    let radio = &components[2];
    assert_eq!(radio["type"], json!("radio"));
    assert_eq!(radio["normalize"], json!("yn-01"));
    assert_eq!(radio["name"], json!("has_children"));
    let yes = &radio["options"][0];
    assert!(yes.get("conditionalChildId").is_none());
    let child = &yes["children"][0];
    assert_eq!(child["storageKey"], json!("child-count"));
    assert_eq!(child["inputType"], json!("number"));
    assert_eq!(child["normalize"], json!("number"));
}

#[test]
fn summary_rows_resolve_aliases_and_labels() {
    let schema = build_json(&BuildOptions::default());
    let summary = &schema["steps"][2]["components"][0];
    assert_eq!(summary["type"], json!("summary-list"));
    assert_eq!(
        summary["rows"],
        json!([
            {"key": "full-name", "label": {"en": "Full name", "fr": "Nom complet"}, "originalKey": "full_name"},
            {"key": "has-children", "label": {"en": "Do you have children?", "fr": "Avez-vous des enfants?"}},
            {"key": "missing", "label": {"en": "Missing", "fr": "Manquant"}}
        ])
    );
    assert_eq!(summary["hideEmpty"], json!(true));
    assert_eq!(summary["emptyFallback"], json!({"en": "Not provided", "fr": "Non fourni"}));
}

#[test]
fn meta_counts_and_template_usage() {
    let schema = build_json(&BuildOptions::default());
    insta::assert_json_snapshot!(schema["meta"], {".generatedAt" => "[timestamp]"}, @r###"
    {
      "counts": {
        "components": 5,
        "steps": 4
      },
      "generatedAt": "[timestamp]",
      "schemaVersion": "1.1",
      "templates": [
        {
          "count": 1,
          "id": 100,
          "template_key": "text-block",
          "type": "text",
          "version": 1
        },
        {
          "count": 2,
          "id": 101,
          "template_key": "input",
          "type": "input",
          "version": 2
        },
        {
          "count": 1,
          "id": 102,
          "template_key": "radio",
          "type": "radios",
          "version": 1
        },
        {
          "count": 1,
          "id": 103,
          "template_key": "textarea",
          "type": "textarea",
          "version": 1
        },
        {
          "count": 1,
          "id": 104,
          "template_key": "summary-list",
          "type": "summary-list",
          "version": 1
        }
      ],
      "workflow": {
        "id": 1,
        "name": "Benefits intake",
        "status": "active"
      }
    }
    "###);
}

#[test]
fn unsupported_type_aborts_with_position_details() {
    let err = build_workflow_schema(
        &store(),
        2,
        &BuildOptions::default(),
        &MiniJinjaRenderer::default(),
    )
    .unwrap_err();
    assert!(err.is(codes::UNSUPPORTED_COMPONENT_TYPE));
    assert_eq!(
        err.details,
        Some(json!({
            "step": "Legacy",
            "step_id": 50,
            "position": 2,
            "template_key": "map-widget",
            "type": "map"
        }))
    );
}

#[test]
fn missing_workflow_is_an_input_error() {
    let err = build_workflow_schema(
        &store(),
        404,
        &BuildOptions::default(),
        &MiniJinjaRenderer::default(),
    )
    .unwrap_err();
    assert!(err.is(codes::WORKFLOW_NOT_FOUND));
}

#[test]
fn audit_passes_for_renderable_templates() {
    let options = BuildOptions {
        audit_templates: true,
        ..BuildOptions::default()
    };
    let schema = build_json(&options);
    assert_eq!(schema["meta"]["counts"]["steps"], json!(4));
}

#[test]
fn audit_failure_reports_every_broken_template() {
    let mut snapshot = store().snapshot().clone();
    for template in &mut snapshot.templates {
        match template.id {
            102 => template.render_source = Some("{% for %}".to_string()),
            103 => template.render_source = None,
            _ => {}
        }
    }
    let options = BuildOptions {
        audit_templates: true,
        ..BuildOptions::default()
    };
    let err = build_workflow_schema(
        &SnapshotStore::new(snapshot),
        1,
        &options,
        &MiniJinjaRenderer::default(),
    )
    .unwrap_err();
    assert!(err.is(codes::TEMPLATE_AUDIT_FAILED));
    let details = err.details.unwrap();
    let failures = details["templates"].as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["template_key"], json!("radio"));
    assert_eq!(failures[0]["reason"], json!("RENDER_ERROR"));
    assert!(failures[0]["detail"].as_str().unwrap().chars().count() <= 200);
    assert_eq!(failures[1]["template_key"], json!("textarea"));
    assert_eq!(failures[1]["reason"], json!("MISSING_TEMPLATE"));
}

#[test]
fn publish_writes_schema_and_meta() {
    let dir = TempDir::new().unwrap();
    let outcome = publish_workflow(
        &store(),
        1,
        &BuildOptions::default(),
        &publish_options(dir.path(), true),
        &MiniJinjaRenderer::default(),
    )
    .unwrap();

    let schema: Value =
        serde_json::from_str(&fs::read_to_string(&outcome.files.schema).unwrap()).unwrap();
    let meta: Value =
        serde_json::from_str(&fs::read_to_string(&outcome.files.meta).unwrap()).unwrap();
    assert_eq!(schema["meta"], meta);
    assert_eq!(schema["steps"].as_array().unwrap().len(), 4);

    let codes: Vec<&str> = outcome.diagnostics.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["PUB-LINT-006", "PUB-LINT-007"]);
}

#[test]
fn failed_build_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let options = publish_options(dir.path(), false);
    let result = publish_workflow(
        &store(),
        2,
        &BuildOptions::default(),
        &options,
        &MiniJinjaRenderer::default(),
    );
    assert!(result.is_err());
    assert!(!options.output_dir.exists());
}

#[test]
fn strict_contract_rejects_lint_errors() {
    let mut snapshot = store().snapshot().clone();
    for component in &mut snapshot.step_components {
        if component.step_id == 10 && component.position == 3 {
            component.props_overrides["items"] = json!([]);
        }
    }
    let dir = TempDir::new().unwrap();
    let options = publish_options(dir.path(), true);
    let err = publish_workflow(
        &SnapshotStore::new(snapshot),
        1,
        &BuildOptions::default(),
        &options,
        &MiniJinjaRenderer::default(),
    )
    .unwrap_err();
    assert!(err.is(codes::CONTRACT_REJECTED));
    assert_eq!(err.details.unwrap()["diagnostics"][0]["code"], json!("PUB-LINT-004"));
    assert!(!options.output_dir.exists());
}
