use intake_publisher::core::config::{ConfigLoader, CONFIG_FILE_NAME};
use intake_publisher::core::error::codes;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_publisher_env() {
    for v in &[
        "INTAKE_PUBLISHER_SCHEMA_VERSION",
        "INTAKE_PUBLISHER_OUTPUT_DIR",
        "INTAKE_PUBLISHER_AUDIT_TEMPLATES",
        "INTAKE_PUBLISHER_STRICT_CONTRACT",
    ] {
        env::remove_var(v);
    }
}

/// File values flow into build and publish options.
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_publisher_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[publish]
schema_version = "1.4"
output_dir = "site/forms"
schema_file = "form.json"
meta_file = "form.meta.json"
audit_templates = true

[normalize]
placeholder_names = ["sample", "demo"]

[audit]
template_search_paths = ["templates"]
detail_max_chars = 120

[logging]
default_level = "warn"
"#;
    fs::write(workspace_path.join(CONFIG_FILE_NAME), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();

    let build = config.build_options();
    assert_eq!(build.schema_version, "1.4");
    assert!(build.audit_templates);
    assert_eq!(build.audit_detail_max_chars, 120);
    assert!(build.normalize.is_placeholder("demo"));
    assert!(!build.normalize.is_placeholder("first-name"));

    let publish = config.publish_options(workspace_path);
    assert_eq!(publish.output_dir, workspace_path.join("site/forms"));
    assert_eq!(publish.schema_file, "form.json");
    assert_eq!(publish.meta_file, "form.meta.json");
    assert!(!publish.strict_contract);

    assert_eq!(
        config.template_search_paths(workspace_path),
        vec![workspace_path.join("templates")]
    );
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_publisher_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[publish]\nstrict_contract = false\noutput_dir = \"from-file\"\n",
    )
    .unwrap();

    env::set_var("INTAKE_PUBLISHER_STRICT_CONTRACT", "1");
    env::set_var("INTAKE_PUBLISHER_OUTPUT_DIR", "/abs/out");
    let result = ConfigLoader::load_from_workspace(temp_dir.path());
    clear_publisher_env();

    let config = result.unwrap();
    assert!(config.publish.strict_contract);
    assert_eq!(
        config.publish_options(temp_dir.path()).output_dir,
        PathBuf::from("/abs/out")
    );
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_publisher_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[publish]\nschema_file = \"\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert!(err.is(codes::INVALID_CONFIG));
}

#[test]
#[serial]
fn test_wrong_types_fail_to_parse() {
    clear_publisher_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[publish]\naudit_templates = \"sometimes\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert!(err.is(codes::INVALID_CONFIG));
    assert!(err.message.contains(CONFIG_FILE_NAME));
}
