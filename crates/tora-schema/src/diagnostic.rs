//! # Diagnostics
//!
//! Turns [`Violation`]s into `$`-rooted location strings and the
//! one-line messages shown to users:
//!
//! ```text
//! "$.server.port" is missing.
//! "$.server.port" "8080" is not of type "number".
//! ```
//!
//! Segments are joined with `.` and never quoted or escaped, so a key that
//! itself contains a dot renders ambiguously. That is accepted.

use std::fmt;

use serde::Serialize;

use crate::engine::{PathSegment, Violation, ViolationKind};

/// Rendered location of a violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticPath(String);

impl DiagnosticPath {
    /// Render the path of a violation, appending the missing property name
    /// when there is one.
    pub fn of(violation: &Violation) -> Self {
        let missing = violation
            .missing_property
            .as_deref()
            .map(|name| PathSegment::Key(name.to_string()));
        Self::from_segments(violation.instance_path.iter().chain(missing.as_ref()))
    }

    /// Render an arbitrary sequence of segments.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a PathSegment>) -> Self {
        let mut rendered = String::from("$");
        for segment in segments {
            rendered.push('.');
            rendered.push_str(&segment.to_string());
        }
        Self(rendered)
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagnosticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-line message for a violation.
pub fn format_violation(violation: &Violation) -> String {
    let path = DiagnosticPath::of(violation);
    if violation.missing_property.is_some() {
        format!("\"{path}\" is missing.")
    } else {
        format!("\"{path}\" {}.", violation.message.trim_end_matches('.'))
    }
}

/// A violation rendered for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// `$`-rooted path, missing property included.
    pub path: String,
    /// The same path, as structured segments.
    pub segments: Vec<PathSegment>,
    /// Violation category.
    pub kind: ViolationKind,
    /// Formatted one-line message.
    pub message: String,
    /// Name of the missing property, if that is what failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_property: Option<String>,
}

impl From<&Violation> for Diagnostic {
    fn from(violation: &Violation) -> Self {
        let mut segments = violation.instance_path.clone();
        if let Some(name) = &violation.missing_property {
            segments.push(PathSegment::Key(name.clone()));
        }
        Self {
            path: DiagnosticPath::of(violation).to_string(),
            segments,
            kind: violation.kind.clone(),
            message: format_violation(violation),
            missing_property: violation.missing_property.clone(),
        }
    }
}

/// Render every violation, keeping engine order.
pub fn diagnostics(violations: &[Violation]) -> Vec<Diagnostic> {
    violations.iter().map(Diagnostic::from).collect()
}
