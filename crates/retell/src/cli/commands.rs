//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Retell - move a story into a new world without leaking the old one
#[derive(Parser, Debug)]
#[command(name = "retell")]
#[command(about = "Retell a narrative in a new context and flag leaked source vocabulary", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the defaults
    #[arg(long, global = true, env = "RETELL_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full transformation pipeline
    Run(RunArgs),

    /// Validate an existing text against the blocklist
    Validate(ValidateArgs),

    /// Print the effective blocklist
    Blocklist(BlocklistArgs),
}

/// Blocklist selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct BlocklistArgs {
    /// File of extra blocklist terms, one per line
    #[arg(long = "blocklist")]
    pub file: Option<PathBuf>,

    /// Do not start from the built-in source vocabulary
    #[arg(long)]
    pub no_default_blocklist: bool,
}

/// Arguments of `retell run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source narrative file
    #[arg(long)]
    pub source: PathBuf,

    /// Target context, inline
    #[arg(long, required_unless_present = "context_file", conflicts_with = "context_file")]
    pub context: Option<String>,

    /// Target context, read from a file
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Blocklist selection
    #[command(flatten)]
    pub blocklist: BlocklistArgs,

    /// Directory receiving the artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Generation model
    #[arg(long)]
    pub model: Option<String>,

    /// Title printed at the top of the story
    #[arg(long)]
    pub title: Option<String>,

    /// Reuse world_bible.json and beats.json from the output directory
    #[arg(long)]
    pub resume: bool,
}

/// Arguments of `retell validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Text to validate
    #[arg(long)]
    pub prose: PathBuf,

    /// Blocklist selection
    #[command(flatten)]
    pub blocklist: BlocklistArgs,
}
