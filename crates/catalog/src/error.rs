// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use buildmux_core::error::{Classify, ErrorClass};
use thiserror::Error;

/// Errors produced while loading a preset catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no CMakePresets.json or CMakeUserPresets.json found in {0}")]
    NoPresetFile(PathBuf),

    #[error("preset file {path} exceeds the {limit_bytes} byte read cap")]
    FileTooLarge { path: PathBuf, limit_bytes: u64 },

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

    #[error("include path {included} in {from} escapes the catalog root")]
    InvalidInclude { from: PathBuf, included: PathBuf },
}

impl Classify for CatalogError {
    fn class(&self) -> ErrorClass {
        ErrorClass::CatalogLoad
    }
}
