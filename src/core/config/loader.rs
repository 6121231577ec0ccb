#![allow(clippy::result_large_err)]

use super::{ConfigValidator, PublisherConfig, CONFIG_FILE_NAME};
use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `intake-publisher.toml` from the workspace root.
    /// Environment variables override file values; a missing file means defaults.
    pub fn load_from_workspace(workspace_path: &Path) -> Result<PublisherConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from_file(&config_path)?.unwrap_or_default();

        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Returns Ok(None) if the file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<PublisherConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: PublisherConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code(codes::INVALID_CONFIG)
        })?;

        Ok(Some(config))
    }

    fn apply_env_overrides(config: &mut PublisherConfig) -> Result<(), AppError> {
        if let Ok(schema_version) = env::var("INTAKE_PUBLISHER_SCHEMA_VERSION") {
            config.publish.schema_version = schema_version;
        }

        if let Ok(output_dir) = env::var("INTAKE_PUBLISHER_OUTPUT_DIR") {
            config.publish.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(value) = env::var("INTAKE_PUBLISHER_AUDIT_TEMPLATES") {
            config.publish.audit_templates = parse_flag("INTAKE_PUBLISHER_AUDIT_TEMPLATES", &value)?;
        }

        if let Ok(value) = env::var("INTAKE_PUBLISHER_STRICT_CONTRACT") {
            config.publish.strict_contract = parse_flag("INTAKE_PUBLISHER_STRICT_CONTRACT", &value)?;
        }

        Ok(())
    }

    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "INTAKE_PUBLISHER_SCHEMA_VERSION - Override meta.schemaVersion (default: 1.1)",
            "INTAKE_PUBLISHER_OUTPUT_DIR - Override the publish directory (default: public)",
            "INTAKE_PUBLISHER_AUDIT_TEMPLATES - Render templates before publishing (true/false)",
            "INTAKE_PUBLISHER_STRICT_CONTRACT - Fail on contract lint errors (true/false)",
            "INTAKE_PUBLISHER_LOG_CONSOLE - Console log sink (stdout/stderr/none)",
            "RUST_LOG - Tracing filter; wins over logging.default_level",
        ]
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(AppError::new(
            ErrorCategory::ConfigError,
            format!("{} must be true or false, got '{}'", name, value),
        )
        .with_code(codes::INVALID_CONFIG)),
    }
}
