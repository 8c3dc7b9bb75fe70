// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-driven progress state machine.
//!
//! One [`ScanState`] is owned per child by its reader task (see
//! `buildmux-engine::supervisor`). Each stdout line is fed through
//! [`ScanState::step`], which mutates the child's [`ProgressState`] in
//! place and returns the log lines that line produced (zero, one, or more),
//! exactly the incremental-parser shape used for the teacher's own
//! line-driven JSONL watcher. The caller wraps each returned string as an
//! `EventKind::Log`.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use std::sync::LazyLock;

use buildmux_core::progress::{Action, Phase, ProgressState};
use regex::Regex;

#[allow(clippy::expect_used)]
static CMEXL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[CMEXL\]\s*(?P<log>.*)$").expect("valid regex"));

#[allow(clippy::expect_used)]
static PKG_DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<pkg>[\w\-]+(?:\[[^\]]*\])?):(?P<triplet>[\w\-]+)(?:@(?P<version>[\w.\-+]+)(?:#(?P<patch>\d+))?)?",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static ALREADY_INSTALLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"The following packages are already installed").expect("valid regex"));

#[allow(clippy::expect_used)]
static NEED_INSTALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"The following packages will be (built and installed|rebuilt|removed|installed)")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static NEED_REMOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"The following packages will be removed").expect("valid regex"));

#[allow(clippy::expect_used)]
static WORK_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<action>Installing|Removing)\s+(?P<cur>\d+)/(?P<total>\d+)").expect("valid regex")
});

#[allow(clippy::expect_used)]
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Additional packages \(\*\) will be modified to complete this operation")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static PKG_MGR_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Running vcpkg install").expect("valid regex"));

#[allow(clippy::expect_used)]
static PKG_MGR_FAILED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Running vcpkg install - failed").expect("valid regex"));

#[allow(clippy::expect_used)]
static PKG_MGR_SUCCESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Running vcpkg install - done").expect("valid regex"));

#[allow(clippy::expect_used)]
static LOCK_WAIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"waiting to take filesystem lock").expect("valid regex"));

#[allow(clippy::expect_used)]
static COMPILER_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Detecting compiler hash").expect("valid regex"));

/// Scanner state, owned exclusively by one reader task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
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

impl Default for ScanState {
    fn default() -> Self {
        ScanState::Default
    }
}

/// Build the display label for a package line: `<pkg> @ <version>[ with
/// patch <patch>]`, trimming a trailing `...` off the version (vcpkg's
/// "still thinking" suffix), or just `<pkg>` when no version was captured.
fn format_package(pkg: &str, version: Option<&str>, patch: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() => {
            let v = v.strip_suffix("...").unwrap_or(v);
            match patch {
                Some(p) => format!("{pkg} @ {v} with patch {p}"),
                None => format!("{pkg} @ {v}"),
            }
        }
        _ => pkg.to_string(),
    }
}

impl ScanState {
    /// Feed one line of child stdout through the state machine, mutating
    /// `pstate` in place and returning the log lines it produced.
    pub fn step(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        match *self {
            ScanState::Default => self.step_default(line),
            ScanState::PkgMgrIdle => self.step_pkg_mgr_idle(line, pstate),
            ScanState::ScanInstalled => self.step_scan_installed(line, pstate),
            ScanState::ScanNeedInstall => self.step_scan_need_install(line, pstate),
            ScanState::ScanNeedRemove => self.step_scan_need_remove(line, pstate),
            ScanState::Working => self.step_working(line, pstate),
        }
    }

    fn step_default(&mut self, line: &str) -> Vec<String> {
        if PKG_MGR_START.is_match(line) {
            *self = ScanState::PkgMgrIdle;
            return vec!["starting package manager".to_string()];
        }
        if let Some(caps) = CMEXL_TAG.captures(line) {
            return vec![caps["log"].to_string()];
        }
        Vec::new()
    }

    fn step_pkg_mgr_idle(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        if LOCK_WAIT.is_match(line) {
            return vec!["waiting for lock".to_string()];
        }
        if COMPILER_HASH.is_match(line) {
            return vec!["checking build environment".to_string()];
        }
        if ALREADY_INSTALLED.is_match(line) {
            *self = ScanState::ScanInstalled;
            pstate.phase = Phase::ScanInstalled;
            return Vec::new();
        }
        if NEED_REMOVE.is_match(line) {
            *self = ScanState::ScanNeedRemove;
            pstate.phase = Phase::ScanNeedRemove;
            return Vec::new();
        }
        if NEED_INSTALL.is_match(line) {
            *self = ScanState::ScanNeedInstall;
            pstate.phase = Phase::ScanNeedInstall;
            return Vec::new();
        }
        if let Some(out) = terminal_pkg_mgr_line(self, line) {
            return out;
        }
        Vec::new()
    }

    fn step_scan_installed(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        if NEED_REMOVE.is_match(line) {
            *self = ScanState::ScanNeedRemove;
            pstate.phase = Phase::ScanNeedRemove;
            return Vec::new();
        }
        if NEED_INSTALL.is_match(line) {
            *self = ScanState::ScanNeedInstall;
            pstate.phase = Phase::ScanNeedInstall;
            return Vec::new();
        }
        if let Some(out) = terminal_pkg_mgr_line(self, line) {
            return out;
        }
        if let Some(caps) = PKG_DETAILS.captures(line) {
            pstate.already_installed += 1;
            let label = format_package(
                &caps["pkg"],
                caps.name("version").map(|m| m.as_str()),
                caps.name("patch").map(|m| m.as_str()),
            );
            return vec![format!("Found installed {label}")];
        }
        Vec::new()
    }

    fn step_scan_need_install(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        if NEED_REMOVE.is_match(line) {
            *self = ScanState::ScanNeedRemove;
            pstate.phase = Phase::ScanNeedRemove;
            return Vec::new();
        }
        if DELIMITER.is_match(line) {
            *self = ScanState::Working;
            pstate.phase = Phase::Working;
            return vec![format!(
                "now building {} required, removing {}",
                pstate.to_install, pstate.to_remove
            )];
        }
        if let Some(caps) = PKG_DETAILS.captures(line) {
            pstate.to_install += 1;
            let label = format_package(
                &caps["pkg"],
                caps.name("version").map(|m| m.as_str()),
                caps.name("patch").map(|m| m.as_str()),
            );
            return vec![format!("Found needed to install {label}")];
        }
        Vec::new()
    }

    fn step_scan_need_remove(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        if NEED_INSTALL.is_match(line) {
            *self = ScanState::ScanNeedInstall;
            pstate.phase = Phase::ScanNeedInstall;
            return Vec::new();
        }
        if DELIMITER.is_match(line) {
            *self = ScanState::Working;
            pstate.phase = Phase::Working;
            return vec![format!(
                "now building {} required, removing {}",
                pstate.to_install, pstate.to_remove
            )];
        }
        if let Some(caps) = PKG_DETAILS.captures(line) {
            pstate.to_remove += 1;
            let label = format_package(
                &caps["pkg"],
                caps.name("version").map(|m| m.as_str()),
                caps.name("patch").map(|m| m.as_str()),
            );
            return vec![format!("Found needed to remove {label}")];
        }
        Vec::new()
    }

    fn step_working(&mut self, line: &str, pstate: &mut ProgressState) -> Vec<String> {
        if let Some(out) = terminal_pkg_mgr_line(self, line) {
            return out;
        }
        if let (Some(work), Some(details)) = (WORK_PROGRESS.captures(line), PKG_DETAILS.captures(line)) {
            let action = if &work["action"] == "Installing" {
                Action::Installing
            } else {
                Action::Removing
            };
            let cur: usize = work["cur"].parse().unwrap_or(0);
            let total: usize = work["total"].parse().unwrap_or(0);
            let label = format_package(
                &details["pkg"],
                details.name("version").map(|m| m.as_str()),
                details.name("patch").map(|m| m.as_str()),
            );
            pstate.current_package = Some(details["pkg"].to_string());
            pstate.current_action = Some(action);
            pstate.completed = cur;
            let verb = action.as_str().to_lowercase();
            return vec![format!("({cur}/{total}) Now {verb} {label}")];
        }
        Vec::new()
    }
}

/// Shared by `PkgMgrIdle`/`ScanInstalled`/`Working`: a failed or
/// successful package-manager run always returns to `Default`.
fn terminal_pkg_mgr_line(state: &mut ScanState, line: &str) -> Option<Vec<String>> {
    if PKG_MGR_FAILED.is_match(line) {
        *state = ScanState::Default;
        return Some(vec!["package manager failed".to_string()]);
    }
    if PKG_MGR_SUCCESS.is_match(line) {
        *state = ScanState::Default;
        return Some(vec!["package manager success".to_string()]);
    }
    None
}

#[cfg(test)]
mod tests;
