// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path builders for the per-run store directory.
//!
//! Layout: `<store>/<name>-<kind>.log`, `<store>/stderr/<name>-<kind>.log`,
//! `<store>/events/<name>-<kind>.log`.

use std::path::{Path, PathBuf};

use buildmux_core::preset::PresetKey;

fn file_stem(key: &PresetKey) -> String {
    format!("{}-{}", key.name, key.kind)
}

pub fn stdout_log_path(store: &Path, key: &PresetKey) -> PathBuf {
    store.join(format!("{}.log", file_stem(key)))
}

pub fn stderr_log_path(store: &Path, key: &PresetKey) -> PathBuf {
    store.join("stderr").join(format!("{}.log", file_stem(key)))
}

pub fn events_log_path(store: &Path, key: &PresetKey) -> PathBuf {
    store.join("events").join(format!("{}.log", file_stem(key)))
}
