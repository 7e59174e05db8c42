//! # tora-check entry point
//!
//! Parses command-line arguments, sets up logging, and runs the check.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tora_cli::check::{run_check, CheckArgs};

/// Check configuration files against a JSON schema before deployment.
///
/// Accepts a single `.json`/`.yaml`/`.yml` file or a directory of them and
/// reports every schema violation as a `$`-rooted path.
#[derive(Parser, Debug)]
#[command(name = "tora-check", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    check: CheckArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    match run_check(&cli.check, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tora_cli::check::OutputFormat;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["tora-check"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.check.schema.to_str(), Some("schema/config-schema.json"));
        assert_eq!(cli.check.target.to_str(), Some("config"));
        assert_eq!(cli.check.format, OutputFormat::Text);
    }

    #[test]
    fn short_and_long_flags() {
        let cli = Cli::try_parse_from([
            "tora-check",
            "-vv",
            "-s",
            "s.json",
            "--target",
            "conf/app.yml",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.check.schema.to_str(), Some("s.json"));
        assert_eq!(cli.check.target.to_str(), Some("conf/app.yml"));
        assert_eq!(cli.check.format, OutputFormat::Json);
    }
}
