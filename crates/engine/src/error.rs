// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduler runtime.

use std::path::PathBuf;

use buildmux_core::error::{Classify, ErrorClass};
use thiserror::Error;

/// Per-child failures. These are folded into a [`crate::ChildRecord`]'s
/// error list rather than propagated out of the supervising task — a
/// failing child never aborts its siblings.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no presets to run")]
    NoPresets,

    #[error("failed to create store directory {path}: {source}")]
    StoreDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {preset}: {source}")]
    SpawnFailure {
        preset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read stdout for {preset}: {source}")]
    StreamIo {
        preset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log for {preset}: {source}")]
    LogIo {
        preset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{preset} exited with status {code}")]
    ChildExit { preset: String, code: i32 },

    #[error("{preset} was terminated by signal")]
    ChildSignaled { preset: String },

    #[error("failed to cancel {preset}: {source}")]
    CancelFailure {
        preset: String,
        #[source]
        source: std::io::Error,
    },
}

impl Classify for RuntimeError {
    fn class(&self) -> ErrorClass {
        match self {
            RuntimeError::NoPresets => ErrorClass::UserInput,
            RuntimeError::StoreDirectory { .. } => ErrorClass::FileSystem,
            RuntimeError::SpawnFailure { .. } => ErrorClass::SpawnFailure,
            RuntimeError::StreamIo { .. } | RuntimeError::LogIo { .. } => ErrorClass::StreamIO,
            RuntimeError::ChildExit { .. } | RuntimeError::ChildSignaled { .. } => {
                ErrorClass::ChildExit
            }
            RuntimeError::CancelFailure { .. } => ErrorClass::StreamIO,
        }
    }
}
