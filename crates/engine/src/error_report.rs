// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error-report extraction: after a child fails, its stderr log (and any
//! package-manager manifest log it names) is filtered down to the lines
//! worth showing a human, per spec.md §4.7 step 9.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|fatal|failed").expect("valid regex"));

#[allow(clippy::expect_used)]
static MANIFEST_LOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<path>\S*vcpkg-manifest-install\.log)").expect("valid regex"));

/// Read `path` (if it exists) and return every line matching the
/// error-pattern filter, in file order. A missing file yields no lines
/// rather than an error: the stderr log may not exist if the child never
/// produced stderr output before failing to spawn.
pub fn filtered_lines(path: &Path) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .filter(|line| ERROR_LINE.is_match(line))
        .map(str::to_string)
        .collect()
}

/// If `line` names a package-manager manifest log, return its path so the
/// caller can open and filter it too.
pub fn manifest_log_path(line: &str) -> Option<PathBuf> {
    MANIFEST_LOG
        .captures(line)
        .map(|caps| PathBuf::from(&caps["path"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_only_error_like_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stderr.log");
        std::fs::write(&path, "building target\nerror: missing header\nlinking\n")
            .expect("write");
        let lines = filtered_lines(&path);
        assert_eq!(lines, vec!["error: missing header".to_string()]);
    }

    #[test]
    fn missing_file_yields_no_lines() {
        let path = Path::new("/nonexistent/stderr.log");
        assert!(filtered_lines(path).is_empty());
    }

    #[test]
    fn extracts_manifest_log_path() {
        let line = "see /tmp/vcpkg/buildtrees/vcpkg-manifest-install.log for details";
        assert_eq!(
            manifest_log_path(line),
            Some(PathBuf::from("/tmp/vcpkg/buildtrees/vcpkg-manifest-install.log"))
        );
    }

    #[test]
    fn no_manifest_path_returns_none() {
        assert_eq!(manifest_log_path("plain line"), None);
    }
}
