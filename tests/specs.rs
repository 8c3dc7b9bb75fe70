// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios from spec.md §8, exercised against the real crates
//! rather than re-deriving their logic. Scenarios that require actually
//! spawning `cmake`/`ctest`/`cpack` child processes (S1, S3, S4) are out of
//! scope for a hermetic test suite with no guarantee those tools are
//! installed; the supervisor's command-building and cancellation-gating
//! logic is covered instead by `crates/engine`'s own unit tests. What's
//! exercised here is everything reachable without an external toolchain:
//! catalog resolution (S5, invariants 1-3), the progress state machine
//! (S2, invariant 8), and the event bus's backpressure contract (S6).

use std::collections::HashMap;
use std::sync::Arc;

use buildmux_core::clock::FakeClock;
use buildmux_core::event::{Event, EventKind};
use buildmux_core::preset::{KindFilter, PresetKind};
use buildmux_core::progress::ProgressState;
use buildmux_core::snapshot::SnapshotHandle;
use buildmux_engine::bus::{make_channel, run_applier};
use buildmux_progress::ScanState;
use tempfile::tempdir;

fn write_preset_file(path: &std::path::Path, contents: &str) {
    std::fs::write(path, contents).expect("write fixture");
}

// -- S5 / invariants 1-3: catalog resolution --------------------------------

#[test]
fn s5_include_last_seen_wins() {
    let dir = tempdir().expect("tempdir");
    write_preset_file(
        &dir.path().join("CMakePresets.json"),
        r#"{
            "include": ["inc1.json"],
            "buildPresets": [{"name": "a", "displayName": "root a"}]
        }"#,
    );
    write_preset_file(
        &dir.path().join("inc1.json"),
        r#"{
            "buildPresets": [
                {"name": "a", "displayName": "inc1 a"},
                {"name": "b", "displayName": "inc1 b"}
            ]
        }"#,
    );

    let catalog = buildmux_catalog::load(dir.path(), KindFilter::All).expect("load catalog");
    let a = catalog
        .iter()
        .find(|(key, _)| key.name == "a" && key.kind == PresetKind::Build)
        .map(|(_, info)| info)
        .expect("preset a present");

    assert_eq!(a.display_name, "inc1 a");
    assert_eq!(a.source_file, dir.path().join("inc1.json"));
}

#[test]
fn invariant_1_kind_filter_only_returns_matching_kind() {
    let dir = tempdir().expect("tempdir");
    write_preset_file(
        &dir.path().join("CMakePresets.json"),
        r#"{
            "configurePresets": [{"name": "default"}],
            "buildPresets": [{"name": "default"}],
            "testPresets": [{"name": "default"}]
        }"#,
    );

    let catalog =
        buildmux_catalog::load(dir.path(), KindFilter::Kind(PresetKind::Build)).expect("load");
    assert!(catalog.keys().all(|key| key.kind == PresetKind::Build));
    assert_eq!(catalog.len(), 1);

    for entry in catalog.values() {
        assert!(entry.source_file.exists());
    }
}

#[test]
fn invariant_2_all_equals_union_of_every_kind() {
    let dir = tempdir().expect("tempdir");
    write_preset_file(
        &dir.path().join("CMakePresets.json"),
        r#"{
            "configurePresets": [{"name": "default"}],
            "buildPresets": [{"name": "default"}],
            "testPresets": [{"name": "default"}],
            "packagePresets": [{"name": "default"}],
            "workflowPresets": [{"name": "default"}]
        }"#,
    );

    let all = buildmux_catalog::load(dir.path(), KindFilter::All).expect("load all");

    let mut union = std::collections::BTreeMap::new();
    for kind in PresetKind::ALL {
        let filtered =
            buildmux_catalog::load(dir.path(), KindFilter::Kind(kind)).expect("load kind");
        union.extend(filtered);
    }

    assert_eq!(all, union);
}

#[test]
fn invariant_3_cyclic_include_terminates() {
    let dir = tempdir().expect("tempdir");
    write_preset_file(
        &dir.path().join("CMakePresets.json"),
        r#"{"include": ["b.json"], "buildPresets": [{"name": "root"}]}"#,
    );
    write_preset_file(
        &dir.path().join("b.json"),
        r#"{"include": ["CMakePresets.json"], "buildPresets": [{"name": "b"}]}"#,
    );

    let catalog = buildmux_catalog::load(dir.path(), KindFilter::All).expect("load terminates");
    assert_eq!(catalog.len(), 2);
}

// -- S1: a plain CMEXL-tagged line passes straight through -------------------

#[test]
fn s1_cmexl_tag_emits_a_single_log_event() {
    let mut scan = ScanState::default();
    let mut pstate = ProgressState::new();

    let out = scan.step("[CMEXL] starting", &mut pstate);

    assert_eq!(out, vec!["starting".to_string()]);
}

// -- S2 / invariant 8: progress state machine -------------------------------

#[test]
fn s2_package_manager_transcript_counters() {
    let lines = [
        "Running vcpkg install",
        "The following packages are already installed:",
        "    pkgC:x64-linux@2.0",
        "    pkgD:x64-linux@3.0",
        "The following packages will be built and installed:",
        "    pkgA:x64-linux@1.0",
        "Additional packages (*) will be modified to complete this operation.",
        "Installing 1/1 pkgA:x64-linux@1.0...",
        "Running vcpkg install - done",
    ];

    let mut scan = ScanState::default();
    let mut pstate = ProgressState::new();
    let mut out = Vec::new();
    for line in lines {
        out.extend(scan.step(line, &mut pstate));
    }

    assert_eq!(pstate.already_installed, 2);
    assert_eq!(pstate.to_install, 1);
    assert_eq!(
        out,
        vec![
            "starting package manager".to_string(),
            "Found installed pkgC @ 2.0".to_string(),
            "Found installed pkgD @ 3.0".to_string(),
            "now building 1 required, removing 0".to_string(),
            "(1/1) Now installing pkgA @ 1.0".to_string(),
            "package manager success".to_string(),
        ]
    );
}

#[test]
fn invariant_8_state_machine_is_deterministic() {
    let lines = [
        "Running vcpkg install",
        "Detecting compiler hash for triplet x64-linux...",
        "The following packages will be built and installed:",
        "    zlib:x64-linux@1.3.0",
        "Additional packages (*) will be modified to complete this operation.",
        "Installing 1/1 zlib:x64-linux@1.3.0...",
        "waiting to take filesystem lock",
    ];

    let run = |lines: &[&str]| {
        let mut scan = ScanState::default();
        let mut pstate = ProgressState::new();
        let mut out = Vec::new();
        for line in lines {
            out.extend(scan.step(line, &mut pstate));
        }
        (out, pstate.to_install, pstate.completed)
    };

    let (out_a, install_a, completed_a) = run(&lines);
    let (out_b, install_b, completed_b) = run(&lines);

    assert_eq!(out_a, out_b);
    assert_eq!(install_a, install_b);
    assert_eq!(completed_a, completed_b);
}

// -- S6: bounded channel backpressure ----------------------------------------

#[tokio::test]
async fn s6_capacity_one_burst_does_not_deadlock() {
    use buildmux_core::preset::PresetKey;

    let key = PresetKey::new("default", PresetKind::Build);
    let clock = FakeClock::new();
    let (tx, rx) = tokio::sync::mpsc::channel::<Event>(1);
    let handle = Arc::new(SnapshotHandle::new(Arc::new(HashMap::new())));
    let mut started = HashMap::new();
    started.insert(key.clone(), clock.epoch_ms());

    let applier = tokio::spawn(run_applier(rx, Arc::clone(&handle), started, clock.clone()));

    let mut sent = 0;
    for i in 0..100 {
        if tx
            .try_send(Event::new(
                key.clone(),
                EventKind::Log {
                    line: format!("line {i}"),
                },
                clock.epoch_ms(),
            ))
            .is_ok()
        {
            sent += 1;
        }
        tokio::task::yield_now().await;
    }
    drop(tx);
    applier.await.expect("applier task completes, no deadlock");

    // Backpressure means not every send necessarily lands, but at least one
    // did and the applier drained cleanly without blocking.
    assert!(sent > 0);
    assert!(handle.load().contains_key(&key));
    let _ = make_channel; // keep `make_channel` import exercised elsewhere in-crate
}

// -- Task-group resolution composed with catalog filtering -------------------

#[test]
fn task_group_resolves_to_workflow_preset_keys() {
    let dir = tempdir().expect("tempdir");
    write_preset_file(
        &dir.path().join("cmexlconf.json"),
        r#"{"tasks": [{"name": "ci", "workflows": ["configure-and-build", "smoke-test"]}]}"#,
    );

    let workflows =
        buildmux_taskgroup::resolve(dir.path(), "buildmux", "ci").expect("resolve task");
    assert_eq!(workflows, vec!["configure-and-build", "smoke-test"]);
}
