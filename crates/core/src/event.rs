// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event vocabulary flowing from child readers onto the event bus.

use crate::preset::PresetKey;

/// What happened to a single child at a point in time.
///
/// A closed, four-variant union, matching the wire shape a build-tool
/// child's stdout reader actually produces: a heartbeat, a parsed log
/// line, an exit, or an out-of-band error. Richer per-package detail
/// (install/remove counts, current package, current phase) lives in the
/// per-child [`crate::progress::ProgressState`] instead — the bus only
/// ever carries text and exit status.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A periodic heartbeat, used to keep the display snapshot's elapsed
    /// time fresh between stdout lines.
    Tick { elapsed_seconds: f64 },
    /// One line the progress state machine emitted.
    Log { line: String },
    /// The child process exited, or was cancelled before it exited on its
    /// own. Either field (or both) may be present.
    Exit {
        context_err: Option<String>,
        wait_err: Option<String>,
    },
    /// An out-of-band failure (stream read, log write, …) that doesn't
    /// stop the child but must be surfaced.
    Error { err: String },
}

impl EventKind {
    /// Variant name used inside the `(Kind)` portion of [`Event::to_log_line`].
    fn variant_name(&self) -> &'static str {
        match self {
            EventKind::Tick { .. } => "Tick",
            EventKind::Log { .. } => "Log",
            EventKind::Exit { .. } => "Exit",
            EventKind::Error { .. } => "Error",
        }
    }

    /// One-line human summary, used both in the diagnostic log line and as
    /// the TUI's "last message" column. This is also exactly the text the
    /// Applier (`buildmux-engine::bus`) writes into a child's display row,
    /// per spec's Exit/Error formatting rules.
    pub fn summary(&self) -> String {
        match self {
            EventKind::Tick { elapsed_seconds } => format!("{elapsed_seconds:.1}s elapsed"),
            EventKind::Log { line } => line.clone(),
            EventKind::Exit {
                context_err,
                wait_err,
            } => match (context_err, wait_err) {
                (None, None) => "no errors after execution".to_string(),
                (Some(c), None) => format!("error during execution: {c}"),
                (None, Some(w)) => format!("error during execution: {w}"),
                (Some(c), Some(w)) => format!("error during execution: {c}; {w}"),
            },
            EventKind::Error { err } => format!("error during execution: {err}"),
        }
    }
}

/// A single timestamped event about one preset's child process.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub key: PresetKey,
    pub kind: EventKind,
    /// Milliseconds since the scheduler epoch, from [`crate::clock::Clock::epoch_ms`].
    pub at_ms: u64,
}

impl Event {
    pub fn new(key: PresetKey, kind: EventKind, at_ms: u64) -> Self {
        Self { key, kind, at_ms }
    }

    /// Diagnostic log-line format: `[name:kind](Kind) <summary>`.
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}]({}) {}",
            self.key,
            self.kind.variant_name(),
            self.kind.summary()
        )
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_log_line())
    }
}
