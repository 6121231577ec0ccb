#![allow(clippy::result_large_err)]

use super::assemble::PublishedSchema;
use crate::core::error::{codes, AppError};
use crate::core::types::ErrorCategory;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Paths written by a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFiles {
    pub schema: PathBuf,
    pub meta: PathBuf,
}

fn write_error(message: String) -> AppError {
    AppError::new(ErrorCategory::IoError, message).with_code(codes::WRITE_FAILED)
}

/// Serialize `value` into a temp file beside `path`; nothing is visible until persisted.
fn stage<T: Serialize>(path: &Path, value: &T) -> Result<NamedTempFile, AppError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir).map_err(|err| {
        write_error(format!("failed to create temp file in {}: {}", dir.display(), err))
    })?;
    let json = serde_json::to_vec_pretty(value)?;
    staged
        .write_all(&json)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| write_error(format!("failed to write {}: {}", staged.path().display(), err)))?;
    Ok(staged)
}

/// Write the schema document and the standalone meta file.
///
/// Both files are staged before either is moved into place, so a failure
/// never leaves a partially written document behind. The meta file is moved
/// first; if the schema rename then fails, the error details list the files
/// already replaced.
pub fn write_published(
    output_dir: &Path,
    schema_file: &str,
    meta_file: &str,
    schema: &PublishedSchema,
) -> Result<PublishedFiles, AppError> {
    fs::create_dir_all(output_dir).map_err(|err| {
        write_error(format!("failed to create {}: {}", output_dir.display(), err))
    })?;
    let files = PublishedFiles {
        schema: output_dir.join(schema_file),
        meta: output_dir.join(meta_file),
    };

    let staged_schema = stage(&files.schema, schema)?;
    let staged_meta = stage(&files.meta, &schema.meta)?;

    // Meta first, then the schema document.
    let mut persisted: Vec<String> = Vec::new();
    for (staged, target) in [(staged_meta, &files.meta), (staged_schema, &files.schema)] {
        staged.persist(target).map_err(|err| {
            if !persisted.is_empty() {
                tracing::error!(
                    path = %target.display(),
                    persisted = ?persisted,
                    "publish left output directory partially updated"
                );
            }
            write_error(format!("failed to replace {}: {}", target.display(), err.error))
                .with_details(json!({
                    "target": target.display().to_string(),
                    "persisted": persisted,
                }))
        })?;
        persisted.push(target.display().to_string());
    }
    tracing::info!(
        schema = %files.schema.display(),
        meta = %files.meta.display(),
        "published schema written"
    );
    Ok(files)
}
