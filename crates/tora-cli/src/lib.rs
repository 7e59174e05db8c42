//! # tora-cli: Configuration Check Command
//!
//! Provides the `tora-check` binary: a pre-deployment gate that checks a
//! config file, or a directory of them, against a JSON schema and exits
//! non-zero on any problem.
//!
//! ```bash
//! tora-check                                   # schema/config-schema.json vs config/
//! tora-check -s schema/app.json -t config/prod.yaml
//! tora-check --format json -t config
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; all checking is delegated to `tora-schema`.
//! - Only `main` decides the process exit code.

pub mod check;
