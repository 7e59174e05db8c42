//! # Validation Engine
//!
//! Compiles a [`SchemaDocument`] once and validates any number of
//! [`ConfigDocument`]s against it, collecting every violation per document
//! in a single pass.
//!
//! The actual JSON Schema semantics (types, `required`, `enum`, bounds,
//! patterns, array constraints, nested `properties`, union types, inline
//! `allOf`/`anyOf`/`oneOf`/`not`) come from the `jsonschema` crate. This
//! module only turns its errors into structured [`Violation`]s.
//!
//! ## Schema Resolution
//!
//! Internal `$ref`s such as `#/$defs/port` resolve natively. Remote
//! `$ref`s are refused at compile time: a configuration gate must give the
//! same answer offline as online.

use std::fmt;
use std::path::PathBuf;

use jsonschema::{error::ValidationErrorKind, Validator};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::document::ConfigDocument;
use crate::error::CheckError;
use crate::schema::SchemaDocument;

/// Retriever that refuses every external `$ref`.
struct OfflineRetriever;

impl jsonschema::Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema references are not supported: {}", uri.as_str()).into())
    }
}

/// One step on the way from the document root to a failing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Category of a violation, keyed off the kind of constraint that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// `required`.
    MissingProperty,
    /// `type`.
    TypeMismatch,
    /// `enum` / `const`.
    EnumMismatch,
    /// `minimum`, `maximum`, their exclusive forms, and `multipleOf`.
    OutOfRange,
    /// `pattern`, `minLength`, `maxLength`, `format`.
    StringConstraint,
    /// `items`, `minItems`, `maxItems`, `uniqueItems`, `contains`.
    ArrayConstraint,
    /// `additionalProperties`, `unevaluatedProperties`, `propertyNames`.
    UnexpectedProperty,
    /// `allOf`, `anyOf`, `oneOf`, `not`, `if`/`then`/`else`, `false` schemas.
    Composition,
    /// Any other keyword, kept verbatim.
    Other(String),
}

impl ViolationKind {
    /// Classify a validator error. Errors without a dedicated category fall
    /// back to the keyword at the end of `schema_path`.
    pub fn from_error(kind: &ValidationErrorKind, schema_path: &str) -> Self {
        use ValidationErrorKind as K;
        match kind {
            K::Required { .. } => Self::MissingProperty,
            K::Type { .. } => Self::TypeMismatch,
            K::Enum { .. } | K::Constant { .. } => Self::EnumMismatch,
            K::Minimum { .. }
            | K::Maximum { .. }
            | K::ExclusiveMinimum { .. }
            | K::ExclusiveMaximum { .. }
            | K::MultipleOf { .. } => Self::OutOfRange,
            K::Pattern { .. } | K::MinLength { .. } | K::MaxLength { .. } | K::Format { .. } => {
                Self::StringConstraint
            }
            K::AdditionalItems { .. }
            | K::MinItems { .. }
            | K::MaxItems { .. }
            | K::UniqueItems
            | K::Contains
            | K::UnevaluatedItems { .. } => Self::ArrayConstraint,
            K::AdditionalProperties { .. }
            | K::UnevaluatedProperties { .. }
            | K::PropertyNames { .. }
            | K::MinProperties { .. }
            | K::MaxProperties { .. } => Self::UnexpectedProperty,
            K::AnyOf | K::OneOfMultipleValid | K::OneOfNotValid | K::Not { .. } | K::FalseSchema => {
                Self::Composition
            }
            _ => Self::from_keyword(last_segment(schema_path)),
        }
    }

    /// Classify by a schema keyword name.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "required" | "dependentRequired" | "dependencies" => Self::MissingProperty,
            "type" => Self::TypeMismatch,
            "enum" | "const" => Self::EnumMismatch,
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" => {
                Self::OutOfRange
            }
            "pattern" | "minLength" | "maxLength" | "format" => Self::StringConstraint,
            "items" | "prefixItems" | "additionalItems" | "minItems" | "maxItems"
            | "uniqueItems" | "contains" | "minContains" | "maxContains" => {
                Self::ArrayConstraint
            }
            "additionalProperties" | "unevaluatedProperties" | "propertyNames"
            | "minProperties" | "maxProperties" => Self::UnexpectedProperty,
            "allOf" | "anyOf" | "oneOf" | "not" | "if" | "then" | "else" => Self::Composition,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stable kebab-case name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingProperty => "missing-required-property",
            Self::TypeMismatch => "type-mismatch",
            Self::EnumMismatch => "enum-mismatch",
            Self::OutOfRange => "out-of-range",
            Self::StringConstraint => "string-constraint",
            Self::ArrayConstraint => "array-constraint",
            Self::UnexpectedProperty => "unexpected-property",
            Self::Composition => "composition",
            Self::Other(keyword) => keyword,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ViolationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Keys and indices from the document root to the failing node.
    /// Empty for a root-level failure.
    pub instance_path: Vec<PathSegment>,
    /// What kind of constraint failed.
    pub kind: ViolationKind,
    /// Human-readable reason, as reported by the validator.
    pub message: String,
    /// For a missing required property, the property name. Not part of
    /// `instance_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_property: Option<String>,
    /// JSON Pointer into the schema to the keyword that failed.
    pub schema_path: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::diagnostic::format_violation(self))
    }
}

/// A schema compiled once and reused across every document in a run.
pub struct CompiledValidator {
    schema_path: PathBuf,
    validator: Validator,
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema_path", &self.schema_path)
            .finish_non_exhaustive()
    }
}

impl CompiledValidator {
    /// Compile `schema` into a reusable validator.
    ///
    /// The draft follows the schema's `$schema` keyword.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::SchemaCompileError`] if the schema is not a
    /// valid JSON Schema, contains an invalid regex, or references an
    /// external document.
    pub fn compile(schema: SchemaDocument) -> Result<Self, CheckError> {
        let validator = jsonschema::options()
            .with_retriever(OfflineRetriever)
            .build(schema.value())
            .map_err(|e| CheckError::SchemaCompileError {
                path: schema.path().to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            path = %schema.path().display(),
            id = schema.id().unwrap_or("-"),
            "compiled schema"
        );

        Ok(Self {
            schema_path: schema.path().to_path_buf(),
            validator,
        })
    }

    /// Validate a document, returning every violation in the order the
    /// validator reports them. An empty vector means the document is valid.
    pub fn validate(&self, document: &ConfigDocument) -> Vec<Violation> {
        self.validate_value(document.value())
    }

    /// Validate a bare value. See [`CompiledValidator::validate`].
    pub fn validate_value(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|err| {
                let pointer = err.instance_path.to_string();
                let schema_path = err.schema_path.to_string();
                let missing_property = match &err.kind {
                    ValidationErrorKind::Required { property } => Some(match property {
                        Value::String(name) => name.clone(),
                        other => other.to_string(),
                    }),
                    _ => None,
                };
                Violation {
                    instance_path: resolve_pointer(&pointer, instance),
                    kind: ViolationKind::from_error(&err.kind, &schema_path),
                    message: err.to_string(),
                    missing_property,
                    schema_path,
                }
            })
            .collect()
    }
}

fn last_segment(pointer: &str) -> &str {
    pointer.rsplit('/').next().unwrap_or(pointer)
}

/// Split a JSON Pointer into segments, typing each one by walking the
/// instance: a segment is an [`PathSegment::Index`] only when its parent
/// node is an array.
fn resolve_pointer(pointer: &str, instance: &Value) -> Vec<PathSegment> {
    if pointer.is_empty() {
        return Vec::new();
    }

    let mut node = Some(instance);
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let token = raw.replace("~1", "/").replace("~0", "~");
            match node {
                Some(Value::Array(items)) => match token.parse::<usize>() {
                    Ok(index) => {
                        node = items.get(index);
                        PathSegment::Index(index)
                    }
                    Err(_) => {
                        node = None;
                        PathSegment::Key(token)
                    }
                },
                Some(Value::Object(map)) => {
                    node = map.get(&token);
                    PathSegment::Key(token)
                }
                _ => {
                    node = None;
                    PathSegment::Key(token)
                }
            }
        })
        .collect()
}
