// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-child progress data, owned exclusively by that child's reader task.
//!
//! `ProgressState` is deliberately not `Clone`: it is mutated in place by
//! the progress state machine as stdout lines arrive, and published to
//! readers only through a [`crate::snapshot::DisplayState`] snapshot, never
//! shared directly.

/// The action a package manager line is reporting progress on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Installing,
    Removing,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Installing => "Installing",
            Action::Removing => "Removing",
        }
    }
}

/// The package-manager scanner's current phase, mirrored 1:1 from
/// `buildmux-progress::ScanState` (the two live in separate crates —
/// `ScanState` owns the transition logic, `Phase` is the value this
/// crate's [`ProgressState`] publishes so the rest of the engine can read
/// "what state is this child's scanner in" without depending on
/// `buildmux-progress` itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No package-manager banner has been seen yet.
    Default,
    /// Banner seen; waiting for a section header or per-line event.
    PkgMgrIdle,
    /// Inside an "already installed" block.
    ScanInstalled,
    /// Inside a "will be built and installed" block.
    ScanNeedInstall,
    /// Inside a "will be removed" block.
    ScanNeedRemove,
    /// Installing or removing packages one at a time.
    Working,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Default
    }
}

/// Mutable progress data for a single child, updated line-by-line by the
/// progress state machine.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub phase: Phase,
    pub to_install: usize,
    pub to_remove: usize,
    pub already_installed: usize,
    pub completed: usize,
    pub current_package: Option<String>,
    pub current_action: Option<Action>,
    pub last_summary: Option<String>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total package count once both install/remove plans have been seen.
    pub fn total_planned(&self) -> usize {
        self.to_install + self.to_remove
    }

    /// `completed / total_planned`, saturating at 1.0 when the plan is empty.
    pub fn fraction_complete(&self) -> f64 {
        let total = self.total_planned();
        if total == 0 {
            1.0
        } else {
            (self.completed as f64 / total as f64).min(1.0)
        }
    }
}
