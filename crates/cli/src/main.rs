// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hourly - scheduled batch runner with bounded log retention

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{install, prune, run, status};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "hourly",
    version,
    about = "Run a batch job once per scheduler tick, keeping a bounded set of logs"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Config file (default: $HOURLY_CONFIG, then ./hourly.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the job once, logging its output (what the schedule executes)
    Run(run::RunArgs),
    /// Write the runner script and register it in the schedule table
    Install(install::InstallArgs),
    /// Show whether a run is in progress and how the last run went
    Status,
    /// Apply log retention now
    Prune(prune::PruneArgs),
}

fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {source}")]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;
    let config = cli.config.as_deref();

    let Some(command) = cli.command else {
        // No subcommand provided: print help and exit 0
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    // `run` installs its own subscriber once it knows the log directory.
    if !matches!(command, Commands::Run(_)) {
        logging::init(None)?;
    }

    match command {
        Commands::Run(args) => run::handle(args, config, format).await,
        Commands::Install(args) => install::handle(args, config, format).await,
        Commands::Status => status::handle(config, format),
        Commands::Prune(args) => prune::handle(args, config, format),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
