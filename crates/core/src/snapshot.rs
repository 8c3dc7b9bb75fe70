// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The double-buffered snapshot the TUI renderer reads from.
//!
//! One task (the Applier, see `buildmux-engine::bus`) owns the write half
//! of a [`SnapshotHandle`]; every other task only ever calls `load()`. The
//! handle hides the buffer-selection bookkeeping so neither side can reach
//! for the wrong slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::preset::PresetKey;

/// High-level status of a single child, derived from its [`crate::progress::Phase`]
/// plus whether the process has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ChildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildStatus::Pending => "pending",
            ChildStatus::Running => "running",
            ChildStatus::Succeeded => "succeeded",
            ChildStatus::Failed => "failed",
            ChildStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChildStatus::Succeeded | ChildStatus::Failed | ChildStatus::Cancelled
        )
    }
}

/// The rendering-ready view of one child, refreshed by the Applier each
/// time an event is folded in. Mirrors spec's minimal `{ log, elapsedSeconds }`
/// `DisplayState`, plus `status`/`error_count` so the scheduler's summary
/// and the Applier's bookkeeping don't need to re-derive them from text.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub key: PresetKey,
    pub status: ChildStatus,
    pub last_message: String,
    pub elapsed_ms: u64,
    pub error_count: usize,
}

impl DisplayState {
    pub fn pending(key: PresetKey) -> Self {
        Self {
            key,
            status: ChildStatus::Pending,
            last_message: String::new(),
            elapsed_ms: 0,
            error_count: 0,
        }
    }
}

/// The full set of per-child display rows the renderer draws each frame.
pub type Snapshot = Arc<HashMap<PresetKey, DisplayState>>;

/// A lock-free double buffer: two `Snapshot` slots plus an index that
/// readers load with `Acquire` and the single writer stores with
/// `Release`.
pub struct SnapshotHandle {
    slots: [parking_lot::Mutex<Snapshot>; 2],
    active: AtomicUsize,
}

impl SnapshotHandle {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            slots: [
                parking_lot::Mutex::new(Arc::clone(&initial)),
                parking_lot::Mutex::new(initial),
            ],
            active: AtomicUsize::new(0),
        }
    }

    /// Read the currently published snapshot. Safe to call from any number
    /// of reader tasks concurrently with the writer's `swap`.
    pub fn load(&self) -> Snapshot {
        let idx = self.active.load(Ordering::Acquire);
        Arc::clone(&self.slots[idx].lock())
    }

    /// Publish a new snapshot into the inactive slot and flip the active
    /// index. Must only be called by the single Applier task.
    pub fn swap(&self, next: Snapshot) {
        let idx = self.active.load(Ordering::Acquire);
        let inactive = 1 - idx;
        *self.slots[inactive].lock() = next;
        self.active.store(inactive, Ordering::Release);
    }
}
