// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use buildmux_core::error::{Classify, ErrorClass};
use thiserror::Error;

/// Errors produced while resolving a named task group.
#[derive(Debug, Error)]
pub enum TaskGroupError {
    #[error("no task configuration found in {0} or its store directory")]
    NoConfigFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown task '{0}'")]
    UnknownTask(String),
}

impl Classify for TaskGroupError {
    fn class(&self) -> ErrorClass {
        ErrorClass::UserInput
    }
}
