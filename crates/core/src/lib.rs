// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared data model for buildmux: preset identity, progress/event types,
//! the double-buffered display snapshot, and a testable clock.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]

pub mod clock;
pub mod error;
pub mod event;
pub mod preset;
pub mod progress;
pub mod snapshot;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::ErrorClass;
pub use event::{Event, EventKind};
pub use preset::{KindFilter, PresetCatalog, PresetInfo, PresetKey, PresetKind};
pub use progress::{Action, Phase, ProgressState};
pub use snapshot::{ChildStatus, DisplayState, Snapshot, SnapshotHandle};
