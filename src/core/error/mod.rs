use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Error codes surfaced by the publisher.
pub mod codes {
    pub const UNSUPPORTED_COMPONENT_TYPE: &str = "PUB-TYPE-001";
    pub const TEMPLATE_AUDIT_FAILED: &str = "PUB-AUDIT-001";
    pub const WORKFLOW_NOT_FOUND: &str = "PUB-INPUT-001";
    pub const SNAPSHOT_UNREADABLE: &str = "PUB-INPUT-002";
    pub const WRITE_FAILED: &str = "PUB-WRITE-001";
    pub const INVALID_CONFIG: &str = "PUB-CFG-001";
    pub const CONTRACT_REJECTED: &str = "PUB-CONTRACT-001";
}

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    /// Machine-readable payload returned to the caller alongside the code.
    pub details: Option<Value>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let code = match category {
            ErrorCategory::ValidationError => "PUB-VALIDATION",
            ErrorCategory::TemplateAuditError => codes::TEMPLATE_AUDIT_FAILED,
            ErrorCategory::InputError => "PUB-INPUT",
            ErrorCategory::SerializationError => "PUB-SERDE",
            ErrorCategory::IoError => "PUB-IO",
            ErrorCategory::ConfigError => codes::INVALID_CONFIG,
            ErrorCategory::InternalError => "PUB-INTERNAL",
        };
        AppError {
            category,
            code: code.to_string(),
            message: message.into(),
            context: BTreeMap::new(),
            details: None,
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    /// True when the error carries the given code.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        let message = e.to_string();
        AppError::with_source(ErrorCategory::IoError, message, Box::new(e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        let message = format!("JSON serialization failed: {}", e);
        AppError::with_source(ErrorCategory::SerializationError, message, Box::new(e))
    }
}
