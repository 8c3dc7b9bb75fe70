use buildmux_core::progress::{Action, Phase, ProgressState};
use proptest::prelude::*;

use super::*;

fn run(lines: &[&str]) -> (ScanState, ProgressState, Vec<String>) {
    let mut state = ScanState::default();
    let mut pstate = ProgressState::new();
    let mut out = Vec::new();
    for line in lines {
        out.extend(state.step(line, &mut pstate));
    }
    (state, pstate, out)
}

#[test]
fn cmexl_tag_is_forwarded_as_log_text() {
    let (_, _pstate, out) = run(&["[CMEXL] starting"]);
    assert_eq!(out, vec!["starting".to_string()]);
}

#[test]
fn full_install_scenario_reaches_working_phase() {
    let (_, pstate, out) = run(&[
        "Running vcpkg install",
        "Detecting compiler hash for triplet x64-linux...",
        "The following packages will be built and installed:",
        "    fmt:x64-linux@10.1.1",
        "    zlib:x64-linux@1.3.0",
        "Additional packages (*) will be modified to complete this operation.",
        "Installing 1/2 fmt:x64-linux@10.1.1...",
        "Installing 2/2 zlib:x64-linux@1.3.0...",
    ]);

    assert_eq!(pstate.to_install, 2);
    assert_eq!(pstate.phase, Phase::Working);
    assert_eq!(pstate.completed, 2);
    assert!(matches!(pstate.current_action, Some(Action::Installing)));
    assert!(out.iter().any(|l| l == "starting package manager"));
    assert!(out.iter().any(|l| l == "(1/2) Now installing fmt @ 10.1.1"));
    assert!(out.iter().any(|l| l == "(2/2) Now installing zlib @ 1.3.0"));
}

#[test]
fn already_installed_block_increments_counter_and_emits_header() {
    let (state, pstate, out) = run(&[
        "Running vcpkg install",
        "The following packages are already installed:",
        "    fmt:x64-linux@10.1.1",
    ]);
    assert_eq!(pstate.already_installed, 1);
    assert_eq!(state, ScanState::ScanInstalled);
    assert_eq!(
        out,
        vec![
            "starting package manager".to_string(),
            "Found installed fmt @ 10.1.1".to_string(),
        ]
    );
}

#[test]
fn lock_wait_emits_waiting_for_lock_text() {
    let (state, _pstate, out) = run(&[
        "Running vcpkg install",
        "waiting to take filesystem lock on /tmp/vcpkg.lock",
    ]);
    assert_eq!(state, ScanState::PkgMgrIdle);
    assert_eq!(out.last().unwrap(), "waiting for lock");
}

#[test]
fn removal_plan_is_tracked_independently_of_install_plan() {
    let (_, pstate, _out) = run(&[
        "Running vcpkg install",
        "The following packages will be removed:",
        "    old-lib:x64-linux@0.9.0",
    ]);
    assert_eq!(pstate.to_remove, 1);
    assert_eq!(pstate.to_install, 0);
}

#[test]
fn need_install_and_need_remove_blocks_can_switch_mid_scan() {
    let (_, pstate, _out) = run(&[
        "Running vcpkg install",
        "The following packages will be built and installed:",
        "    fmt:x64-linux@10.1.1",
        "The following packages will be removed:",
        "    old-lib:x64-linux@0.9.0",
    ]);
    assert_eq!(pstate.to_install, 1);
    assert_eq!(pstate.to_remove, 1);
}

#[test]
fn package_manager_failure_returns_to_default() {
    let (state, _pstate, out) = run(&["Running vcpkg install", "Running vcpkg install - failed"]);
    assert_eq!(state, ScanState::Default);
    assert_eq!(out.last().unwrap(), "package manager failed");
}

#[test]
fn package_manager_success_returns_to_default() {
    let (state, _pstate, out) = run(&["Running vcpkg install", "Running vcpkg install - done"]);
    assert_eq!(state, ScanState::Default);
    assert_eq!(out.last().unwrap(), "package manager success");
}

#[test]
fn unrecognized_lines_outside_a_banner_produce_no_output() {
    let (_, _pstate, out) = run(&["note: some build-tool banner nobody parses"]);
    assert!(out.is_empty());
}

#[test]
fn blank_lines_outside_a_section_produce_no_event() {
    let (_, _pstate, out) = run(&[""]);
    assert!(out.is_empty());
}

#[test]
fn package_without_version_is_formatted_without_at_clause() {
    let (_, pstate, out) = run(&[
        "Running vcpkg install",
        "The following packages are already installed:",
        "    fmt:x64-linux",
    ]);
    assert_eq!(pstate.already_installed, 1);
    assert_eq!(out.last().unwrap(), "Found installed fmt");
}

proptest! {
    /// Feeding the same line sequence twice from a fresh state always
    /// produces the same final `ProgressState` counters — the state
    /// machine is a pure function of its input, not of wall-clock time.
    #[test]
    fn step_is_deterministic(lines in proptest::collection::vec("[a-zA-Z0-9/:@. -]{0,40}", 0..20)) {
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let (_, first, _) = run(&refs);
        let (_, second, _) = run(&refs);
        prop_assert_eq!(first.to_install, second.to_install);
        prop_assert_eq!(first.to_remove, second.to_remove);
        prop_assert_eq!(first.completed, second.completed);
        prop_assert_eq!(first.already_installed, second.already_installed);
    }
}
