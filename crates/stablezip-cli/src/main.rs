//! Stablezip CLI - Command-line utility for building reproducible,
//! content-addressed ZIP bundles.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod outputs;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_progress = !cli.quiet && !cli.json;

    match &cli.command {
        cli::Commands::Create(args) => commands::create::execute(args, &*formatter, show_progress),
        cli::Commands::Hash(args) => commands::hash::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}
