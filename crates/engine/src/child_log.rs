// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-child log writers.
//!
//! Grounded on `ActivityLogger`'s create-parent-then-open-append pattern,
//! generalized from "one append per call" to "one open handle held for the
//! child's lifetime": a streaming build's stdout volume is much higher
//! than the teacher's activity-log volume, so opening a fresh file handle
//! per line would be wasteful.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::RuntimeError;

/// An open, append-mode log file for one child's stdout, stderr, or event
/// stream.
pub struct ChildLog {
    writer: BufWriter<File>,
}

impl ChildLog {
    /// Open (creating parent directories and the file itself as needed)
    /// the log at `path` for appending.
    pub fn open(path: &Path, preset: &str) -> Result<Self, RuntimeError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RuntimeError::LogIo {
                preset: preset.to_string(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RuntimeError::LogIo {
                preset: preset.to_string(),
                source,
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for ChildLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
