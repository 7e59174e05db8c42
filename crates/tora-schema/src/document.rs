//! # Document Loading
//!
//! Reads a configuration file and normalizes it into a [`serde_json::Value`]
//! regardless of the on-disk format, so the engine never needs to know
//! whether a document started life as JSON or YAML.
//!
//! The format is chosen from the file extension through the closed
//! [`DocumentFormat`] set. Anything outside that set is rejected up front.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::CheckError;

/// On-disk format of a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// `.json`, parsed with strict JSON rules.
    Json,
    /// `.yaml` / `.yml`.
    Yaml,
    /// Anything else. Holds the extension as found (empty if none).
    Unsupported(String),
}

impl DocumentFormat {
    /// Pick the format from a path's extension. ASCII case-insensitive.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Unsupported(ext.to_string()),
        }
    }

    /// Whether documents in this format can be loaded.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
            Self::Unsupported(ext) => write!(f, "unsupported ({ext})"),
        }
    }
}

/// A parsed configuration document, ready to validate.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    path: PathBuf,
    format: DocumentFormat,
    value: Value,
}

impl ConfigDocument {
    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format the document was parsed as.
    pub fn format(&self) -> &DocumentFormat {
        &self.format
    }

    /// The document content.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Load and parse the configuration document at `path`.
///
/// # Errors
///
/// - [`CheckError::UnsupportedFormat`] if the extension is not `.json`,
///   `.yaml` or `.yml`.
/// - [`CheckError::Io`] if the file cannot be read.
/// - [`CheckError::ParseError`] on a syntax error, on content that is not
///   UTF-8, or on YAML content JSON cannot represent.
/// - [`CheckError::EmptyDocument`] if the file is blank or parses to null.
pub fn load_document(path: &Path) -> Result<ConfigDocument, CheckError> {
    let format = DocumentFormat::from_path(path);
    if let DocumentFormat::Unsupported(extension) = &format {
        return Err(CheckError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension.clone(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::InvalidData => CheckError::ParseError {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {source}"),
        },
        _ => CheckError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    tracing::debug!(path = %path.display(), %format, bytes = content.len(), "loaded config file");

    let value = parse_content(&content, &format).map_err(|reason| CheckError::ParseError {
        path: path.to_path_buf(),
        reason,
    })?;

    match value {
        None | Some(Value::Null) => Err(CheckError::EmptyDocument {
            path: path.to_path_buf(),
        }),
        Some(value) => Ok(ConfigDocument {
            path: path.to_path_buf(),
            format,
            value,
        }),
    }
}

/// Parse `content` as `format`. `Ok(None)` means there was nothing to parse.
fn parse_content(content: &str, format: &DocumentFormat) -> Result<Option<Value>, String> {
    match format {
        DocumentFormat::Json => {
            if content.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(content)
                .map(Some)
                .map_err(|e| format!("invalid JSON: {e}"))
        }
        DocumentFormat::Yaml => {
            if is_blank_yaml(content) {
                return Ok(None);
            }
            let mut yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml.apply_merge()
                .map_err(|e| format!("invalid YAML merge key: {e}"))?;
            yaml_to_json_value(&yaml).map(Some)
        }
        DocumentFormat::Unsupported(ext) => Err(format!("unsupported extension {ext:?}")),
    }
}

/// A YAML stream with nothing but whitespace, comments, and document markers.
fn is_blank_yaml(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Convert a `serde_yaml::Value` (merge keys already applied) into the
/// equivalent `serde_json::Value`. Tags are dropped; anything without a JSON
/// representation is an error.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => yaml_number(n).map(Value::Number),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(mapping) => mapping
            .iter()
            .map(|(key, value)| Ok((yaml_key(key)?, yaml_to_json_value(value)?)))
            .collect::<Result<serde_json::Map<_, _>, String>>()
            .map(Value::Object),
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

/// Integers keep their exact value; floats must be finite.
fn yaml_number(n: &serde_yaml::Number) -> Result<serde_json::Number, String> {
    if let Some(i) = n.as_i64() {
        Ok(i.into())
    } else if let Some(u) = n.as_u64() {
        Ok(u.into())
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .ok_or_else(|| format!("cannot represent number {n} in JSON"))
    }
}

/// JSON object keys are strings, so scalar YAML keys are stringified the way
/// they were written (`null`/`~` becomes `"null"`). Compound keys are an error.
fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(&tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => {
            Err(format!("unsupported YAML mapping key: {key:?}"))
        }
    }
}
