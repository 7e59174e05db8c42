//! # tora-schema: Configuration Validation Engine
//!
//! Checks JSON and YAML configuration files against a JSON schema and
//! reports each problem at a stable, `$`-rooted location such as
//! `$.server.port`.
//!
//! ## Pipeline
//!
//! - [`target`] expands a file or directory into the files to check.
//! - [`schema`] loads the schema definition.
//! - [`document`] loads each configuration file, whatever its format,
//!   into a `serde_json::Value`.
//! - [`engine`] compiles the schema once and collects every violation per
//!   document.
//! - [`diagnostic`] renders violations as `"$.a.b" is missing.` lines.
//! - [`check`] wires all of the above into one fail-fast run.
//!
//! ## Crate Policy
//!
//! - Nothing here exits the process or prints. Every failure comes back
//!   as a [`CheckError`].
//! - Documents are never modified.

pub mod check;
pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod error;
pub mod schema;
pub mod target;

// Re-export primary types.
pub use check::{
    run_check, CheckReport, Checker, FileReport, FileStatus, DEFAULT_SCHEMA_PATH,
    DEFAULT_TARGET_PATH,
};
pub use diagnostic::{format_violation, Diagnostic, DiagnosticPath};
pub use document::{load_document, ConfigDocument, DocumentFormat};
pub use engine::{CompiledValidator, PathSegment, Violation, ViolationKind};
pub use error::CheckError;
pub use schema::{load_schema, SchemaDocument};
pub use target::resolve_targets;
