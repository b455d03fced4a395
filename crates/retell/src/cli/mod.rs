//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the retell binary.

mod blocklist;
mod commands;
mod run;
mod validate;

pub use blocklist::print_blocklist;
pub use commands::{BlocklistArgs, Cli, Commands, RunArgs, ValidateArgs};
pub use run::run_pipeline;
pub use validate::validate_prose;
