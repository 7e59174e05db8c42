//! # Check Pipeline
//!
//! One run: load and compile the schema, resolve the target, then load and
//! validate each file in order.
//!
//! The run is fail-fast. A load or parse error aborts it with a
//! [`CheckError`]. A document with violations ends it too, but as a
//! report whose last file is marked failed and carries every violation for
//! that file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::diagnostic::{diagnostics, Diagnostic};
use crate::document::{load_document, ConfigDocument, DocumentFormat};
use crate::engine::{CompiledValidator, Violation};
use crate::error::CheckError;
use crate::schema::load_schema;
use crate::target::resolve_targets;

/// Default schema location, relative to the working directory.
pub const DEFAULT_SCHEMA_PATH: &str = "schema/config-schema.json";

/// Default check target, relative to the working directory.
pub const DEFAULT_TARGET_PATH: &str = "config";

/// Outcome for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// No violations.
    Passed,
    /// At least one violation.
    Failed,
}

/// Result of checking one document.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Document path as resolved from the target.
    pub path: PathBuf,
    /// Format the document was parsed as.
    pub format: DocumentFormat,
    /// Pass or fail.
    pub status: FileStatus,
    /// Rendered violations, in engine order.
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    violations: Vec<Violation>,
}

impl FileReport {
    fn new(document: &ConfigDocument, violations: Vec<Violation>) -> Self {
        let status = if violations.is_empty() {
            FileStatus::Passed
        } else {
            FileStatus::Failed
        };
        Self {
            path: document.path().to_path_buf(),
            format: document.format().clone(),
            status,
            diagnostics: diagnostics(&violations),
            violations,
        }
    }

    /// Whether the document satisfied the schema.
    pub fn passed(&self) -> bool {
        self.status == FileStatus::Passed
    }

    /// The raw violations behind [`FileReport::diagnostics`].
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Turn a failed report into [`CheckError::ValidationFailed`] carrying
    /// every violation. A passing report comes back unchanged.
    pub fn into_result(self) -> Result<Self, CheckError> {
        if self.passed() {
            Ok(self)
        } else {
            Err(CheckError::ValidationFailed {
                path: self.path,
                violations: self.violations,
            })
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Schema every file was checked against.
    pub schema: PathBuf,
    /// Target as given.
    pub target: PathBuf,
    /// Files checked, in check order. Stops at the first failed file.
    pub files: Vec<FileReport>,
    /// True when every file passed.
    pub passed: bool,
}

impl CheckReport {
    /// The file that ended the run, if one failed.
    pub fn failure(&self) -> Option<&FileReport> {
        self.files.iter().find(|f| !f.passed())
    }
}

/// A compiled schema, ready to check any number of files.
#[derive(Debug)]
pub struct Checker {
    validator: CompiledValidator,
}

impl Checker {
    /// Load and compile the schema at `schema_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::SchemaNotFound`], [`CheckError::SchemaParseError`]
    /// or [`CheckError::SchemaCompileError`].
    pub fn new(schema_path: &Path) -> Result<Self, CheckError> {
        let schema = load_schema(schema_path)?;
        Ok(Self {
            validator: CompiledValidator::compile(schema)?,
        })
    }

    /// Load and validate one document.
    ///
    /// Violations do not make this fail; they are recorded on the report.
    ///
    /// # Errors
    ///
    /// Any error from [`load_document`].
    pub fn check_file(&self, path: &Path) -> Result<FileReport, CheckError> {
        let document = load_document(path)?;
        let violations = self.validator.validate(&document);
        tracing::info!(
            path = %path.display(),
            violations = violations.len(),
            "checked config file"
        );
        Ok(FileReport::new(&document, violations))
    }

    /// Check `files` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first load error hit.
    pub fn check_files(&self, files: &[PathBuf]) -> Result<Vec<FileReport>, CheckError> {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let report = self.check_file(path)?;
            let failed = !report.passed();
            reports.push(report);
            if failed {
                break;
            }
        }
        Ok(reports)
    }
}

/// Run a full check of `target` against the schema at `schema_path`.
///
/// The schema is loaded and compiled before the target is resolved, so a
/// broken schema is reported even when the target is also broken.
///
/// # Errors
///
/// Every [`CheckError`] except `ValidationFailed`, which is reported
/// through [`CheckReport::passed`] instead.
pub fn run_check(schema_path: &Path, target: &Path) -> Result<CheckReport, CheckError> {
    let checker = Checker::new(schema_path)?;
    let files = resolve_targets(target)?;
    let reports = checker.check_files(&files)?;
    let passed = reports.iter().all(FileReport::passed);

    Ok(CheckReport {
        schema: schema_path.to_path_buf(),
        target: target.to_path_buf(),
        files: reports,
        passed,
    })
}
