//! # Error Types
//!
//! Every failure a check run can hit. All of them are terminal: the
//! pipeline stops at the first one and hands it back to the caller, which
//! decides how to report it and which exit code to use.
//!
//! Every variant carries the path it refers to, so a message is always
//! actionable on its own.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Violation;

/// Errors returned by schema loading, document loading, target resolution,
/// and validation.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The schema path does not point at an existing file.
    #[error("schema file {} does not exist", .path.display())]
    SchemaNotFound {
        /// Schema path as given.
        path: PathBuf,
    },

    /// The schema file is not valid JSON.
    #[error("failed to parse schema file {}: {reason}", .path.display())]
    SchemaParseError {
        /// Schema path as given.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The schema parsed but could not be compiled into a validator
    /// (for example an invalid regex in a `pattern` keyword).
    #[error("failed to compile schema {}: {reason}", .path.display())]
    SchemaCompileError {
        /// Schema path as given.
        path: PathBuf,
        /// Compiler message.
        reason: String,
    },

    /// The check target does not exist.
    #[error("specified target {} does not exist", .path.display())]
    TargetNotFound {
        /// Target path as given.
        path: PathBuf,
    },

    /// The check target is neither a regular file nor a directory.
    #[error("specified target {} is neither a file nor a directory", .path.display())]
    InvalidTargetType {
        /// Target path as given.
        path: PathBuf,
    },

    /// A target directory holds no `.json`, `.yaml`, or `.yml` files.
    #[error("no eligible files (.json, .yaml, .yml) found in {}", .path.display())]
    NoEligibleFiles {
        /// Directory that was scanned.
        path: PathBuf,
    },

    /// A document has an extension the loader does not understand.
    #[error("unsupported file format {:?} for {}", .extension, .path.display())]
    UnsupportedFormat {
        /// Offending document.
        path: PathBuf,
        /// Extension as found on disk (empty if there was none).
        extension: String,
    },

    /// A document could not be parsed.
    #[error("failed to parse config file {}: {reason}", .path.display())]
    ParseError {
        /// Offending document.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A document parsed to nothing.
    #[error("config file {} is empty", .path.display())]
    EmptyDocument {
        /// Offending document.
        path: PathBuf,
    },

    /// A document does not satisfy the schema.
    #[error("config file {} failed validation with {} violation(s)", .path.display(), .violations.len())]
    ValidationFailed {
        /// Offending document.
        path: PathBuf,
        /// Every violation found, in engine order. Never empty.
        violations: Vec<Violation>,
    },

    /// A read failed for a reason other than the file being absent.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    /// The path this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::SchemaNotFound { path }
            | Self::SchemaParseError { path, .. }
            | Self::SchemaCompileError { path, .. }
            | Self::TargetNotFound { path }
            | Self::InvalidTargetType { path }
            | Self::NoEligibleFiles { path }
            | Self::UnsupportedFormat { path, .. }
            | Self::ParseError { path, .. }
            | Self::EmptyDocument { path }
            | Self::ValidationFailed { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}
