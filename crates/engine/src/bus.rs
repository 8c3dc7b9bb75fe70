// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event bus and its single Applier task.
//!
//! Producers (one per child, see `supervisor::run_child`) push onto a
//! bounded `mpsc` channel with `try_send`, dropping events when the
//! channel is full rather than blocking a child's stdout pump. The
//! Applier is the bus's single consumer: it folds each event into the
//! child's running `DisplayState` and republishes the whole map through a
//! [`SnapshotHandle`] for the TUI renderer to read.

use std::collections::HashMap;
use std::sync::Arc;

use buildmux_core::clock::Clock;
use buildmux_core::event::{Event, EventKind};
use buildmux_core::preset::PresetKey;
use buildmux_core::snapshot::{ChildStatus, DisplayState, Snapshot, SnapshotHandle};
use tokio::sync::mpsc;

/// Size the channel generously relative to the number of children and the
/// Ticker's frequency: `num_presets * (ceil(ticker_hz) + 1) * event_scale`,
/// so a burst of package lines from every child at once still fits before
/// backpressure kicks in.
pub fn channel_capacity(num_presets: usize) -> usize {
    const TICKER_HZ_CEIL: usize = 4; // 250ms ticks => 4Hz
    const EVENT_SCALE: usize = 20;
    num_presets.max(1) * (TICKER_HZ_CEIL + 1) * EVENT_SCALE
}

/// Build a sized event channel for `num_presets` concurrently running
/// children.
pub fn make_channel(num_presets: usize) -> (mpsc::Sender<Event>, mpsc::Receiver<Event>) {
    mpsc::channel(channel_capacity(num_presets))
}

/// Run the Applier loop until the channel is closed (every producer
/// dropped its sender), publishing a fresh snapshot after each event.
pub async fn run_applier<C: Clock>(
    mut rx: mpsc::Receiver<Event>,
    handle: Arc<SnapshotHandle>,
    started_at: HashMap<PresetKey, u64>,
    clock: C,
) {
    let mut rows: HashMap<PresetKey, DisplayState> = started_at
        .keys()
        .cloned()
        .map(|key| (key.clone(), DisplayState::pending(key)))
        .collect();

    while let Some(event) = rx.recv().await {
        apply(&mut rows, &event, &started_at, &clock);
        let published: Snapshot = Arc::new(rows.clone());
        handle.swap(published);
    }
}

fn apply<C: Clock>(
    rows: &mut HashMap<PresetKey, DisplayState>,
    event: &Event,
    started_at: &HashMap<PresetKey, u64>,
    clock: &C,
) {
    let row = rows
        .entry(event.key.clone())
        .or_insert_with(|| DisplayState::pending(event.key.clone()));

    let start_ms = started_at.get(&event.key).copied().unwrap_or(clock.epoch_ms());
    row.elapsed_ms = clock.epoch_ms().saturating_sub(start_ms);

    match &event.kind {
        EventKind::Log { .. } => {
            if !row.status.is_terminal() {
                row.status = ChildStatus::Running;
            }
            row.last_message = event.kind.summary();
        }
        EventKind::Tick { .. } => {
            if !row.status.is_terminal() {
                row.status = ChildStatus::Running;
            }
            // Leaves the prior message in place; a tick carries no text.
        }
        EventKind::Exit {
            context_err,
            wait_err,
        } => {
            row.status = if context_err.is_some() {
                ChildStatus::Cancelled
            } else if wait_err.is_some() {
                ChildStatus::Failed
            } else {
                ChildStatus::Succeeded
            };
            row.error_count += usize::from(context_err.is_some() || wait_err.is_some());
            row.last_message = event.kind.summary();
        }
        EventKind::Error { .. } => {
            row.error_count += 1;
            row.last_message = event.kind.summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildmux_core::clock::FakeClock;
    use buildmux_core::preset::PresetKind;

    #[tokio::test]
    async fn applier_publishes_running_status_on_log() {
        let key = PresetKey::new("default", PresetKind::Build);
        let clock = FakeClock::new();
        let (tx, rx) = make_channel(1);
        let handle = Arc::new(SnapshotHandle::new(Arc::new(HashMap::new())));
        let mut started = HashMap::new();
        started.insert(key.clone(), clock.epoch_ms());

        let handle_clone = Arc::clone(&handle);
        let applier = tokio::spawn(run_applier(rx, handle_clone, started, clock.clone()));

        tx.send(Event::new(
            key.clone(),
            EventKind::Log {
                line: "starting package manager".to_string(),
            },
            clock.epoch_ms(),
        ))
        .await
        .expect("send");
        drop(tx);
        applier.await.expect("applier task");

        let snapshot = handle.load();
        assert_eq!(snapshot[&key].status, ChildStatus::Running);
        assert_eq!(snapshot[&key].last_message, "starting package manager");
    }

    #[tokio::test]
    async fn applier_marks_cancelled_exit_distinct_from_failure() {
        let key = PresetKey::new("default", PresetKind::Build);
        let clock = FakeClock::new();
        let (tx, rx) = make_channel(1);
        let handle = Arc::new(SnapshotHandle::new(Arc::new(HashMap::new())));
        let mut started = HashMap::new();
        started.insert(key.clone(), clock.epoch_ms());

        let handle_clone = Arc::clone(&handle);
        let applier = tokio::spawn(run_applier(rx, handle_clone, started, clock.clone()));

        tx.send(Event::new(
            key.clone(),
            EventKind::Exit {
                context_err: Some("cancelled".to_string()),
                wait_err: None,
            },
            clock.epoch_ms(),
        ))
        .await
        .expect("send");
        drop(tx);
        applier.await.expect("applier task");

        let snapshot = handle.load();
        assert_eq!(snapshot[&key].status, ChildStatus::Cancelled);
        assert_eq!(snapshot[&key].error_count, 1);
    }
}
