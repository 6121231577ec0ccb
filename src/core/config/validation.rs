#![allow(clippy::result_large_err)]

use super::PublisherConfig;
use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &PublisherConfig) -> Result<(), AppError> {
        let publish = &config.publish;
        if publish.schema_version.trim().is_empty() {
            return Err(invalid("publish.schema_version cannot be empty"));
        }

        for (key, name) in [
            ("publish.schema_file", &publish.schema_file),
            ("publish.meta_file", &publish.meta_file),
        ] {
            if name.trim().is_empty() {
                return Err(invalid(format!("{} cannot be empty", key)));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(invalid(format!("{} must be a bare file name", key)));
            }
        }

        if publish.schema_file == publish.meta_file {
            return Err(invalid("publish.schema_file and publish.meta_file must differ"));
        }

        if publish.output_dir.as_os_str().is_empty() {
            return Err(invalid("publish.output_dir cannot be empty"));
        }

        if config.audit.detail_max_chars == 0 {
            return Err(invalid("audit.detail_max_chars must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCategory::ConfigError, message).with_code(codes::INVALID_CONFIG)
}
