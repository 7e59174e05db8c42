//! # Schema Loading
//!
//! Reads the JSON schema definition a run validates against. The schema is
//! always JSON, whatever format the configuration files use.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::CheckError;

/// A parsed, not yet compiled, schema definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    path: PathBuf,
    value: Value,
}

impl SchemaDocument {
    /// Wrap an in-memory schema. `path` is only used in diagnostics.
    pub fn from_value(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// Path the schema was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The schema JSON.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The `$id` of the schema, if it declares one.
    pub fn id(&self) -> Option<&str> {
        self.value.get("$id").and_then(Value::as_str)
    }
}

/// Load the schema file at `path`.
///
/// # Errors
///
/// - [`CheckError::SchemaNotFound`] if `path` is not an existing file.
/// - [`CheckError::Io`] if the file exists but cannot be read.
/// - [`CheckError::SchemaParseError`] if the content is not UTF-8 JSON.
pub fn load_schema(path: &Path) -> Result<SchemaDocument, CheckError> {
    if !path.is_file() {
        return Err(CheckError::SchemaNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::InvalidData => CheckError::SchemaParseError {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {source}"),
        },
        _ => CheckError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|e| CheckError::SchemaParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), "loaded schema");

    Ok(SchemaDocument {
        path: path.to_path_buf(),
        value,
    })
}
