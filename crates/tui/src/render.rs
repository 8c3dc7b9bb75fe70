// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use buildmux_core::preset::PresetKey;
use buildmux_core::snapshot::{DisplayState, SnapshotHandle};
use buildmux_core::time_fmt::format_elapsed;
use tokio::sync::watch;

/// Fixed 60 Hz redraw cadence, per spec's `~16ms` frame budget.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const HOME_AND_CLEAR: &str = "\x1b[H\x1b[0J";

/// Handle used by the scheduler to stop the renderer once every child has
/// finished. Dropping the stop sender closes the watch channel the render
/// loop is waiting on; the join handle lets the caller await the final
/// frame (and the cursor-show escape) before moving on.
pub struct TuiHandle {
    stop_tx: watch::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TuiHandle {
    /// Signal the renderer to stop and wait for it to render its final
    /// frame and restore the cursor, per spec.
    pub async fn stop(self) {
        drop(self.stop_tx);
        let _ = self.task.await;
    }
}

/// Render one frame's text for `order` (the pre-sorted row order fixed at
/// scheduler startup) from `snapshot`. A pure function so frame layout is
/// testable without a terminal.
pub fn render_frame(order: &[PresetKey], snapshot: &std::collections::HashMap<PresetKey, DisplayState>) -> String {
    let mut out = String::new();
    out.push_str("buildmux — running presets\n\n");
    for (i, key) in order.iter().enumerate() {
        let row = snapshot.get(key);
        let (elapsed, log) = match row {
            Some(state) => (
                format_elapsed(Duration::from_millis(state.elapsed_ms)),
                state.last_message.trim_end_matches(['\r', '\n']).to_string(),
            ),
            None => ("0s".to_string(), String::new()),
        };
        out.push_str(&format!(
            "{}. {} ({}, {elapsed}) : {log}\n",
            i + 1,
            key.name,
            key.kind
        ));
    }
    out
}

/// Run the fixed-rate redraw loop until `stop` is dropped. Hides the
/// cursor on entry, shows it again (unconditionally) on exit, and always
/// renders one more frame after the stop signal fires before returning.
pub async fn run(
    handle: Arc<SnapshotHandle>,
    order: Vec<PresetKey>,
    mut out: impl Write + Send + 'static,
) -> TuiHandle {
    let (stop_tx, mut stop_rx) = watch::channel(());

    let task = tokio::spawn(async move {
        let _ = write!(out, "{HIDE_CURSOR}");
        let _ = out.flush();

        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    draw(&handle, &order, &mut out);
                }
                _ = stop_rx.changed() => {
                    // Sender dropped: this resolves to an error, meaning
                    // "stop". Render once more, then exit.
                    draw(&handle, &order, &mut out);
                    break;
                }
            }
        }

        let _ = write!(out, "{SHOW_CURSOR}");
        let _ = out.flush();
    });

    TuiHandle { stop_tx, task }
}

fn draw(handle: &SnapshotHandle, order: &[PresetKey], out: &mut impl Write) {
    let snapshot = handle.load();
    let frame = render_frame(order, &snapshot);
    let _ = write!(out, "{HOME_AND_CLEAR}{frame}");
    let _ = out.flush();
}
