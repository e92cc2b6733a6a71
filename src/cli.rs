use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Themis declarative evaluation pipeline.
#[derive(Parser)]
#[command(
    name = "themis",
    version,
    about = "Score model predictions against observations from a declarative configuration"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run a full evaluation and write the result document.
    Evaluate(EvaluateArgs),
    /// Merge and validate configuration fragments without running.
    Validate(ValidateArgs),
    /// Merge configuration fragments and emit the combined document.
    Merge(MergeArgs),
}

/// Arguments for the `evaluate` subcommand.
#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// JSON configuration fragment(s), merged in order.
    #[arg(short, long = "config", required = true)]
    pub config: Vec<PathBuf>,

    /// Path for the result JSON document (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `validate` subcommand.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// JSON configuration fragment(s), merged in order.
    #[arg(short, long = "config", required = true)]
    pub config: Vec<PathBuf>,
}

/// Arguments for the `merge` subcommand.
#[derive(clap::Args)]
pub struct MergeArgs {
    /// JSON configuration fragment(s), merged in order.
    #[arg(short, long = "config", required = true)]
    pub config: Vec<PathBuf>,

    /// Path for the merged JSON document (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
