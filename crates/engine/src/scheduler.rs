// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler Entry: creates the store directory, launches children in
//! parallel or serial mode, drains the remaining children on shutdown,
//! and prints the aggregate package/error summary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildmux_core::clock::Clock;
use buildmux_core::event::EventKind;
use buildmux_core::preset::{PresetCatalog, PresetKey};
use buildmux_core::snapshot::{ChildStatus, SnapshotHandle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bus::{make_channel, run_applier};
use crate::error::RuntimeError;
use crate::log_paths;
use crate::supervisor::{run_child, ChildOutcome};

/// Options threaded through from the CLI's `schedule` command.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub store: PathBuf,
    pub save_events: bool,
    pub refresh: bool,
    pub serial: bool,
}

/// Outcome of a full scheduling run: one [`ChildOutcome`] per preset that
/// was launched, in launch order.
pub struct ScheduleReport {
    pub outcomes: Vec<ChildOutcome>,
}

impl ScheduleReport {
    /// Whether any child failed — the CLI uses this to decide its process
    /// exit code without flipping it for every per-child error class.
    pub fn any_failed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, ChildStatus::Failed))
    }
}

fn create_store_layout(store: &Path) -> Result<(), RuntimeError> {
    for dir in [store.to_path_buf(), store.join("stderr"), store.join("events")] {
        std::fs::create_dir_all(&dir).map_err(|source| RuntimeError::StoreDirectory {
            path: dir,
            source,
        })?;
    }
    Ok(())
}

/// Run every preset in `keys` against `catalog`, respecting `config`'s
/// parallel/serial mode, until completion or `cancel` fires.
pub async fn run<C: Clock + 'static>(
    mut keys: Vec<PresetKey>,
    catalog: &PresetCatalog,
    config: ScheduleConfig,
    clock: C,
    cancel: CancellationToken,
) -> Result<ScheduleReport, RuntimeError> {
    if keys.is_empty() {
        return Err(RuntimeError::NoPresets);
    }
    // Fix the TUI's row order up front, per spec step 2.
    keys.sort();

    create_store_layout(&config.store)?;

    let _ = catalog; // catalog validation happens before keys reach the scheduler

    let (events_tx, events_rx) = make_channel(keys.len());
    let snapshot_handle = Arc::new(SnapshotHandle::new(Arc::new(HashMap::new())));

    let started_at: HashMap<PresetKey, u64> = keys
        .iter()
        .cloned()
        .map(|k| (k, clock.epoch_ms()))
        .collect();

    let applier = tokio::spawn(run_applier(
        events_rx,
        Arc::clone(&snapshot_handle),
        started_at,
        clock.clone(),
    ));

    let tui_handle = buildmux_tui::run(
        Arc::clone(&snapshot_handle),
        keys.clone(),
        std::io::stdout(),
    )
    .await;

    let outcomes = if config.serial {
        run_serial(keys, &config, events_tx, clock, cancel).await
    } else {
        run_parallel(keys, &config, events_tx, clock, cancel).await
    };

    // The Applier exits once every sender is dropped; awaiting it here
    // drains any events still in flight before the summary is printed.
    let _ = applier.await;
    tui_handle.stop().await;

    print_summary(&outcomes, &config.store);
    Ok(ScheduleReport { outcomes })
}

async fn run_parallel<C: Clock + 'static>(
    keys: Vec<PresetKey>,
    config: &ScheduleConfig,
    events_tx: tokio::sync::mpsc::Sender<buildmux_core::event::Event>,
    clock: C,
    cancel: CancellationToken,
) -> Vec<ChildOutcome> {
    let mut handles = Vec::with_capacity(keys.len());
    for key in keys {
        let store = config.store.clone();
        let tx = events_tx.clone();
        let clock = clock.clone();
        let cancel = cancel.clone();
        let refresh = config.refresh;
        let save_events = config.save_events;
        handles.push(tokio::spawn(async move {
            run_child(key, refresh, save_events, &store, tx, clock, cancel).await
        }));
    }
    drop(events_tx);

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Ok(outcome) = handle.await {
            outcomes.push(outcome);
        }
    }
    outcomes
}

async fn run_serial<C: Clock + 'static>(
    keys: Vec<PresetKey>,
    config: &ScheduleConfig,
    events_tx: tokio::sync::mpsc::Sender<buildmux_core::event::Event>,
    clock: C,
    cancel: CancellationToken,
) -> Vec<ChildOutcome> {
    let mut outcomes = Vec::with_capacity(keys.len());
    for key in keys {
        if cancel.is_cancelled() {
            break;
        }
        info!(preset = %key, "waiting for lock");
        let _ = events_tx.try_send(buildmux_core::event::Event::new(
            key.clone(),
            EventKind::Log {
                line: "waiting for lock".to_string(),
            },
            clock.epoch_ms(),
        ));
        let outcome = run_child(
            key,
            config.refresh,
            config.save_events,
            &config.store,
            events_tx.clone(),
            clock.clone(),
            cancel.clone(),
        )
        .await;
        outcomes.push(outcome);
    }
    drop(events_tx);
    outcomes
}

fn print_summary(outcomes: &[ChildOutcome], store: &Path) {
    println!();
    println!("package summary:");
    for outcome in outcomes {
        println!(
            "  [{}] installed={} removed={} already_installed={}",
            outcome.key,
            outcome.progress.to_install,
            outcome.progress.to_remove,
            outcome.progress.already_installed,
        );
    }

    let failed: Vec<&ChildOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o.status, ChildStatus::Failed))
        .collect();

    println!();
    println!(
        "{} preset(s) run, {} failed",
        outcomes.len(),
        failed.len()
    );
    if failed.is_empty() {
        return;
    }

    println!();
    println!("error report:");
    for outcome in &failed {
        println!("  [{}]", outcome.key);
        for err in &outcome.errors {
            println!("    {err}");
        }
        let stderr_path = log_paths::stderr_log_path(store, &outcome.key);
        for line in crate::error_report::filtered_lines(&stderr_path) {
            println!("    stderr: {line}");
            if let Some(manifest) = crate::error_report::manifest_log_path(&line) {
                for manifest_line in crate::error_report::filtered_lines(&manifest) {
                    println!("    manifest: {manifest_line}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildmux_core::clock::SystemClock;
    use buildmux_core::preset::PresetKind;
    use tempfile::tempdir;

    #[test]
    fn store_layout_creates_expected_subdirectories() {
        let dir = tempdir().expect("tempdir");
        create_store_layout(dir.path()).expect("create layout");
        assert!(dir.path().join("stderr").is_dir());
        assert!(dir.path().join("events").is_dir());
    }

    #[tokio::test]
    async fn scheduling_an_empty_key_list_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let config = ScheduleConfig {
            store: dir.path().to_path_buf(),
            save_events: false,
            refresh: false,
            serial: false,
        };
        let catalog = PresetCatalog::new();
        let err = run(
            Vec::new(),
            &catalog,
            config,
            SystemClock,
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RuntimeError::NoPresets));
        let _ = PresetKind::Build;
    }
}
