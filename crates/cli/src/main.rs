// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! buildmux - concurrent CMake/ctest/cpack preset orchestration

mod color;
mod commands;
mod output;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{list, schedule};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "buildmux",
    version,
    about = "Drive CMake/ctest/cpack presets concurrently, with a live progress TUI"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Name of the store directory (`.<name>/`) used for logs and task config
    #[arg(long = "store", global = true, default_value = "buildmux")]
    store_name: String,

    /// Raise the default log level from `info` to `debug`
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List presets from the catalog
    List(list::ListArgs),
    /// Schedule one or more presets (or a named task group) to run
    Schedule(schedule::ScheduleArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root_dir = match &cli.directory {
        Some(dir) => std::fs::canonicalize(dir)?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List(args) => {
            list::run(&args, &root_dir, cli.output)?;
        }
        Commands::Schedule(args) => {
            let store_dir = schedule::default_store_dir(&root_dir, &cli.store_name);
            let report = schedule::run(&args, &root_dir, &store_dir, &cli.store_name).await?;
            // Per-child failures are surfaced in the printed summary but
            // never flip the process exit code — only scheduler-fatal
            // errors (catalog load, unknown presets, no presets to run),
            // which already propagated above via `?`, do that.
            let _ = report.any_failed();
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
