//! Command-line interface for synthkit.
//!
//! Provides the `create` and `ingest` commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
