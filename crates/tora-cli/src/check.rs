//! # Check Command
//!
//! Runs one check of a target against a schema and renders the outcome.
//!
//! The text layout for a failing file is:
//!
//! ```text
//! Config File Check Failed:
//!     File -> /srv/app/config/app.json
//!     ERROR -> "$.port" is missing.
//! ```
//!
//! Returns exit code 0 when every file passes and 1 on any failure. All
//! failures share that code; the category is only visible in the text.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use tora_schema::{CheckError, CheckReport, DEFAULT_SCHEMA_PATH, DEFAULT_TARGET_PATH};

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON report object.
    Json,
}

/// Arguments for a check run.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the JSON schema file.
    #[arg(short, long, value_name = "SCHEMA", default_value = DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,

    /// Config file, or directory of config files, to check.
    #[arg(short, long, value_name = "TARGET", default_value = DEFAULT_TARGET_PATH)]
    pub target: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
            target: PathBuf::from(DEFAULT_TARGET_PATH),
            format: OutputFormat::Text,
        }
    }
}

/// Execute a check run, writing the report to `out` and errors to `err`.
///
/// Returns the process exit code.
pub fn run_check(args: &CheckArgs, out: &mut impl Write, err: &mut impl Write) -> Result<u8> {
    tracing::debug!(
        schema = %args.schema.display(),
        target = %args.target.display(),
        "starting config check"
    );

    let report = match tora_schema::run_check(&args.schema, &args.target) {
        Ok(report) => report,
        Err(e) => {
            tracing::debug!(error = ?e, "check aborted");
            writeln!(err, "ERROR: {}", describe(&e)).context("failed to write error")?;
            return Ok(1);
        }
    };

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report, out),
        OutputFormat::Json => render_json(&report, out),
    };
    rendered.context("failed to write report")?;

    Ok(if report.passed { 0 } else { 1 })
}

/// Message for an aborted run. Paths of files that exist are shown
/// resolved; missing schema and target paths are shown as given.
fn describe(error: &CheckError) -> String {
    let path = resolved(error.path());
    match error {
        CheckError::ParseError { reason, .. } => {
            format!("failed to parse config file {}: {reason}", path.display())
        }
        CheckError::EmptyDocument { .. } => format!("config file {} is empty", path.display()),
        CheckError::UnsupportedFormat { extension, .. } => {
            format!("unsupported file format {extension:?} for {}", path.display())
        }
        CheckError::Io { source, .. } => format!("failed to read {}: {source}", path.display()),
        other => other.to_string(),
    }
}

fn render_text(report: &CheckReport, out: &mut impl Write) -> std::io::Result<()> {
    for file in &report.files {
        match file.clone().into_result() {
            Ok(file) => writeln!(out, "OK: {}", resolved(&file.path).display())?,
            Err(error) => render_failure(&error, out)?,
        }
    }

    if report.passed {
        writeln!(
            out,
            "{} config file(s) passed schema check against {}",
            report.files.len(),
            report.schema.display()
        )?;
    }
    Ok(())
}

fn render_failure(error: &CheckError, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Config File Check Failed:")?;
    writeln!(out, "    File -> {}", resolved(error.path()).display())?;
    match error {
        CheckError::ValidationFailed { violations, .. } => {
            for violation in violations {
                writeln!(out, "    ERROR -> {violation}")?;
            }
        }
        other => writeln!(out, "    ERROR -> {other}")?,
    }
    Ok(())
}

fn render_json(report: &CheckReport, out: &mut impl Write) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

fn resolved(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORT_SCHEMA: &str =
        r#"{"type":"object","required":["port"],"properties":{"port":{"type":"number"}}}"#;

    struct Run {
        code: u8,
        stdout: String,
        stderr: String,
    }

    fn run(args: &CheckArgs) -> Run {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_check(args, &mut stdout, &mut stderr).unwrap();
        Run {
            code,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    fn args_for(dir: &Path, target: &str) -> CheckArgs {
        CheckArgs {
            schema: dir.join("schema.json"),
            target: dir.join(target),
            format: OutputFormat::Text,
        }
    }

    fn setup(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("schema.json"), PORT_SCHEMA).unwrap();
        std::fs::create_dir(dir.path().join("config")).unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join("config").join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn valid_file_exits_0() {
        let dir = setup(&[("app.json", r#"{"port":8080}"#)]);
        let result = run(&args_for(dir.path(), "config/app.json"));
        assert_eq!(result.code, 0);
        assert!(result.stdout.starts_with("OK: "));
        assert!(result.stdout.contains("1 config file(s) passed"));
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn missing_property_exits_1_with_block() {
        let dir = setup(&[("app.json", r#"{"host":"x"}"#)]);
        let result = run(&args_for(dir.path(), "config/app.json"));
        assert_eq!(result.code, 1);
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines[0], "Config File Check Failed:");
        assert!(lines[1].starts_with("    File -> "));
        assert!(lines[1].ends_with("app.json"));
        assert_eq!(lines[2], "    ERROR -> \"$.port\" is missing.");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn every_violation_gets_an_error_line() {
        let dir = setup(&[
            ("a.json", r#"{"port":1,"host":"h"}"#),
            ("b.json", r#"{"port":"x","extra":1}"#),
        ]);
        std::fs::write(
            dir.path().join("schema.json"),
            r#"{"type":"object","required":["port","host"],"properties":{"port":{"type":"number"},"host":{"type":"string"}},"additionalProperties":false}"#,
        )
        .unwrap();
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 1);
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert!(lines[0].starts_with("OK: "));
        assert!(lines[0].ends_with("a.json"));
        assert_eq!(lines[1], "Config File Check Failed:");
        assert!(lines[2].ends_with("b.json"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("    ERROR -> ")).count(), 3);
        assert!(lines.contains(&"    ERROR -> \"$.host\" is missing."));
    }

    #[test]
    fn type_mismatch_exits_1() {
        let dir = setup(&[("app.yaml", "port: \"8080\"\n")]);
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 1);
        assert!(result.stdout.contains("ERROR -> \"$.port\" "));
        assert!(result.stdout.contains("is not of type"));
    }

    #[test]
    fn missing_target_exits_1_and_names_it() {
        let dir = setup(&[]);
        let result = run(&args_for(dir.path(), "does-not-exist"));
        assert_eq!(result.code, 1);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.starts_with("ERROR: "));
        assert!(result.stderr.contains("does-not-exist"));
    }

    #[test]
    fn missing_schema_exits_1() {
        let dir = setup(&[("app.json", r#"{"port":1}"#)]);
        let mut args = args_for(dir.path(), "config");
        args.schema = dir.path().join("nope.json");
        let result = run(&args);
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("schema file"));
    }

    #[test]
    fn empty_directory_exits_1() {
        let dir = setup(&[("notes.txt", "hello")]);
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("no eligible files"));
    }

    #[test]
    fn parse_error_exits_1() {
        let dir = setup(&[("app.json", "{")]);
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("failed to parse config file"));
    }

    #[test]
    fn unsupported_file_shows_resolved_path() {
        let dir = setup(&[("app.toml", "port = 1\n")]);
        let result = run(&args_for(dir.path(), "config/app.toml"));
        assert_eq!(result.code, 1);
        let resolved = std::fs::canonicalize(dir.path().join("config/app.toml")).unwrap();
        assert_eq!(
            result.stderr.trim_end(),
            format!("ERROR: unsupported file format \"toml\" for {}", resolved.display())
        );
    }

    #[test]
    fn non_utf8_file_is_a_parse_failure() {
        let dir = setup(&[]);
        std::fs::write(dir.path().join("config/app.yaml"), b"port: \xff\n").unwrap();
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 1);
        assert!(result.stderr.contains("failed to parse config file"), "{}", result.stderr);
    }

    #[test]
    fn directory_reports_each_passing_file() {
        let dir = setup(&[("a.json", r#"{"port":1}"#), ("b.yml", "port: 2\n")]);
        let result = run(&args_for(dir.path(), "config"));
        assert_eq!(result.code, 0);
        assert_eq!(result.stdout.matches("OK: ").count(), 2);
        assert!(result.stdout.contains("2 config file(s) passed"));
    }

    #[test]
    fn json_format_emits_report() {
        let dir = setup(&[("app.json", r#"{"port":"8080"}"#)]);
        let mut args = args_for(dir.path(), "config");
        args.format = OutputFormat::Json;
        let result = run(&args);
        assert_eq!(result.code, 1);

        let report: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
        assert_eq!(report["passed"], false);
        let file = &report["files"][0];
        assert_eq!(file["status"], "failed");
        assert_eq!(file["format"], "json");
        assert_eq!(file["diagnostics"][0]["path"], "$.port");
        assert_eq!(file["diagnostics"][0]["kind"], "type-mismatch");
    }

    #[test]
    fn output_is_idempotent() {
        let dir = setup(&[("a.json", r#"{"port":1}"#), ("b.json", "{}")]);
        let args = args_for(dir.path(), "config");
        let first = run(&args);
        let second = run(&args);
        assert_eq!(first.code, second.code);
        assert_eq!(first.stdout, second.stdout);
    }

    #[test]
    fn default_args_point_at_conventional_paths() {
        let args = CheckArgs::default();
        assert_eq!(args.schema, PathBuf::from("schema/config-schema.json"));
        assert_eq!(args.target, PathBuf::from("config"));
    }
}
