mod cli;
mod evaluate_cmd;
mod fragments;
mod logging;
mod merge_cmd;
mod validate_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Evaluate(args) => evaluate_cmd::run(args),
        Command::Validate(args) => validate_cmd::run(args),
        Command::Merge(args) => merge_cmd::run(args),
    }
}
