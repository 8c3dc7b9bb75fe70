// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `buildmux schedule` — run a set of presets (named directly, or expanded
//! from a task group) through the scheduler.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use buildmux_core::clock::SystemClock;
use buildmux_core::preset::{KindFilter, PresetKey, PresetKind};
use buildmux_engine::{scheduler, ScheduleConfig};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub task: Option<ScheduleCommand>,

    /// Kind of the named presets, required unless `task <name>` is used.
    #[arg(short = 't', long = "kind", value_name = "KIND")]
    pub kind: Option<PresetKind>,

    /// Preset names to run, in the order given on the command line.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Record a textual event trace alongside each preset's stdout log.
    #[arg(long)]
    pub save_events: bool,

    /// Pass `--fresh` through to the underlying build-tool invocation.
    #[arg(long)]
    pub refresh: bool,

    /// Run presets one at a time instead of all in parallel.
    #[arg(short = 's', long)]
    pub serial: bool,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Resolve a named task group and run its workflow presets.
    Task {
        /// Task name, looked up in `cmexlconf.json`.
        name: String,
    },
}

pub async fn run(
    args: &ScheduleArgs,
    root_dir: &Path,
    store_dir: &Path,
    store_dir_name: &str,
) -> Result<scheduler::ScheduleReport> {
    let keys = resolve_keys(args, root_dir, store_dir_name)?;

    let catalog = buildmux_catalog::load(root_dir, KindFilter::All)
        .context("failed to load preset catalog")?;
    for key in &keys {
        if !catalog.contains_key(key) {
            bail!("unknown preset: {key}");
        }
    }

    let config = ScheduleConfig {
        store: store_dir.to_path_buf(),
        save_events: args.save_events,
        refresh: args.refresh,
        serial: args.serial,
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let report = scheduler::run(keys, &catalog, config, SystemClock, cancel).await?;
    Ok(report)
}

fn resolve_keys(
    args: &ScheduleArgs,
    root_dir: &Path,
    store_dir_name: &str,
) -> Result<Vec<PresetKey>> {
    match &args.task {
        Some(ScheduleCommand::Task { name }) => {
            let workflows = buildmux_taskgroup::resolve(root_dir, store_dir_name, name)
                .with_context(|| format!("failed to resolve task '{name}'"))?;
            Ok(workflows
                .into_iter()
                .map(|name| PresetKey::new(name, PresetKind::Workflow))
                .collect())
        }
        None => {
            let kind = args
                .kind
                .ok_or_else(|| anyhow::anyhow!("-t/--kind is required unless `task <name>` is used"))?;
            if args.names.is_empty() {
                bail!("at least one preset name is required");
            }
            Ok(args
                .names
                .iter()
                .cloned()
                .map(|name| PresetKey::new(name, kind))
                .collect())
        }
    }
}

pub fn default_store_dir(root_dir: &Path, store_dir_name: &str) -> PathBuf {
    root_dir.join(format!(".{store_dir_name}"))
}
