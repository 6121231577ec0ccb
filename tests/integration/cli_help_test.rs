use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn publisher(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("intake-publisher"));
    cmd.env("HOME", home)
        .env("CI", "1")
        .env_remove("RUST_LOG")
        .env_remove("INTAKE_PUBLISHER_OUTPUT_DIR")
        .env_remove("INTAKE_PUBLISHER_SCHEMA_VERSION")
        .env_remove("INTAKE_PUBLISHER_AUDIT_TEMPLATES")
        .env_remove("INTAKE_PUBLISHER_STRICT_CONTRACT");
    cmd
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/benefits_snapshot.yaml")
}

#[test]
fn top_level_help_lists_commands() {
    let home = TempDir::new().unwrap();
    publisher(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMANDS"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("types"));
}

#[test]
fn publish_help_documents_flags() {
    let home = TempDir::new().unwrap();
    publisher(home.path())
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--snapshot"))
        .stdout(predicate::str::contains("--workflow"))
        .stdout(predicate::str::contains("--out-dir"))
        .stdout(predicate::str::contains("--strict"))
        .stdout(predicate::str::contains("intake-publisher publish --snapshot"));
}

#[test]
fn version_flag_prints_crate_version() {
    let home = TempDir::new().unwrap();
    publisher(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn types_lists_vocabulary_and_aliases() {
    let home = TempDir::new().unwrap();
    publisher(home.path())
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("signature-ack"))
        .stdout(predicate::str::contains("checkbox -> checkboxes"))
        .stdout(predicate::str::contains("radios -> radio"));
}

#[test]
fn publish_writes_files_into_workspace() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("intake-publisher.toml"),
        "[publish]\nschema_version = \"2.0\"\noutput_dir = \"dist\"\n",
    )
    .unwrap();

    publisher(home.path())
        .arg("publish")
        .arg("--snapshot")
        .arg(fixture())
        .args(["--workflow", "1", "--audit"])
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Published workflow 1 (4 steps, 5 components)"));

    let meta: Value = serde_json::from_str(
        &fs::read_to_string(workspace.path().join("dist/intakeFormSchema.meta.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(meta["schemaVersion"], "2.0");
    assert!(workspace.path().join("dist/intakeFormSchema.json").exists());
}

#[test]
fn publish_failure_prints_code_and_details() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    publisher(home.path())
        .arg("publish")
        .arg("--snapshot")
        .arg(fixture())
        .args(["--workflow", "2"])
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[PUB-TYPE-001]"))
        .stderr(predicate::str::contains("\"template_key\": \"map-widget\""));
    assert!(!workspace.path().join("public").exists());
}

#[test]
fn check_emits_json_diagnostics() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let output = publisher(home.path())
        .arg("check")
        .arg("--snapshot")
        .arg(fixture())
        .args(["--workflow", "1", "--format", "json"])
        .arg("--workspace")
        .arg(workspace.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["unreachable"], serde_json::json!(["orphan"]));
    let codes: Vec<&str> = report["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["PUB-LINT-006", "PUB-LINT-007"]);
}

#[test]
fn missing_snapshot_is_reported() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    publisher(home.path())
        .args(["check", "--snapshot", "does-not-exist.json", "--workflow", "1"])
        .arg("--workspace")
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("PUB-INPUT-002"));
}
