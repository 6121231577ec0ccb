use crate::core::workflow_schema::normalize::{NormalizeOptions, DEFAULT_PLACEHOLDER_NAMES};
use crate::core::workflow_schema::{
    BuildOptions, PublishOptions, DEFAULT_AUDIT_DETAIL_CHARS, DEFAULT_SCHEMA_VERSION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

/// File read from the workspace root.
pub const CONFIG_FILE_NAME: &str = "intake-publisher.toml";

/// Publisher configuration loaded from `intake-publisher.toml`.
///
/// The `[logging]` table lives in the same file and is read by
/// [`crate::logging::config::LoggingConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PublisherConfig {
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishConfig {
    /// Version stamped into `meta.schemaVersion`
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Target directory, relative paths resolve against the workspace
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_schema_file")]
    pub schema_file: String,

    #[serde(default = "default_meta_file")]
    pub meta_file: String,

    /// Render every used template before publishing
    #[serde(default)]
    pub audit_templates: bool,

    /// Refuse to write when the contract lint reports errors
    #[serde(default)]
    pub strict_contract: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizeConfig {
    /// Authoring ids never used as storage keys
    #[serde(default = "default_placeholder_names")]
    pub placeholder_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
    /// Directories searched by `{% include %}` and `{% from %}` during the audit
    #[serde(default)]
    pub template_search_paths: Vec<PathBuf>,

    #[serde(default = "default_detail_max_chars")]
    pub detail_max_chars: usize,
}

fn default_schema_version() -> String {
    DEFAULT_SCHEMA_VERSION.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_schema_file() -> String {
    "intakeFormSchema.json".to_string()
}

fn default_meta_file() -> String {
    "intakeFormSchema.meta.json".to_string()
}

fn default_placeholder_names() -> Vec<String> {
    DEFAULT_PLACEHOLDER_NAMES.iter().map(|name| name.to_string()).collect()
}

fn default_detail_max_chars() -> usize {
    DEFAULT_AUDIT_DETAIL_CHARS
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            schema_version: default_schema_version(),
            output_dir: default_output_dir(),
            schema_file: default_schema_file(),
            meta_file: default_meta_file(),
            audit_templates: false,
            strict_contract: false,
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeConfig {
            placeholder_names: default_placeholder_names(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            template_search_paths: Vec::new(),
            detail_max_chars: default_detail_max_chars(),
        }
    }
}

impl PublisherConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            schema_version: self.publish.schema_version.clone(),
            audit_templates: self.publish.audit_templates,
            audit_detail_max_chars: self.audit.detail_max_chars,
            normalize: NormalizeOptions::with_placeholders(&self.normalize.placeholder_names),
        }
    }

    pub fn publish_options(&self, workspace: &Path) -> PublishOptions {
        PublishOptions {
            output_dir: anchor(workspace, &self.publish.output_dir),
            schema_file: self.publish.schema_file.clone(),
            meta_file: self.publish.meta_file.clone(),
            strict_contract: self.publish.strict_contract,
        }
    }

    /// Audit search paths resolved against the workspace.
    pub fn template_search_paths(&self, workspace: &Path) -> Vec<PathBuf> {
        self.audit
            .template_search_paths
            .iter()
            .map(|path| anchor(workspace, path))
            .collect()
    }
}

fn anchor(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}
