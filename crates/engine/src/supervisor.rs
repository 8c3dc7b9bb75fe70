// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Child Supervisor: spawns one preset as a child process and runs
//! three cooperating tasks against it — Waiter, Reader, Ticker — joined
//! with `tokio::select!` inside a shared cancellation scope, generalizing
//! `subprocess::run_with_timeout`'s `Command` wrapping from a one-shot
//! `.output()` call to a long-lived piped child whose stdout must stream.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use buildmux_core::clock::Clock;
use buildmux_core::event::{Event, EventKind};
use buildmux_core::preset::{PresetKey, PresetKind};
use buildmux_core::snapshot::ChildStatus;
use buildmux_progress::ScanState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::child_log::ChildLog;
use crate::error::RuntimeError;
use crate::log_paths;

/// How often the Ticker emits a heartbeat event between stdout lines.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Build the `cmake`/`ctest`/`cpack` invocation for a preset, per the
/// upstream build tool's own CLI surface.
pub fn build_command(key: &PresetKey, refresh: bool) -> Command {
    let (program, leading_args): (&str, &[&str]) = match key.kind {
        PresetKind::Configure => ("cmake", &[]),
        PresetKind::Build => ("cmake", &["--build"]),
        PresetKind::Workflow => ("cmake", &["--workflow"]),
        PresetKind::Test => ("ctest", &[]),
        PresetKind::Package => ("cpack", &[]),
    };

    let mut cmd = Command::new(program);
    cmd.args(leading_args);
    cmd.arg("--preset").arg(&key.name);
    if refresh {
        cmd.arg("--fresh");
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    cmd
}

/// Final result of one child's run, folded into the scheduler's
/// per-preset package and error summary.
pub struct ChildOutcome {
    pub key: PresetKey,
    pub status: ChildStatus,
    pub errors: Vec<RuntimeError>,
    /// The package-manager counters this child's stdout reached, for the
    /// scheduler's package summary (spec.md §4.7 step 8). Stays at its
    /// default zero value for children that never reached the scanner.
    pub progress: buildmux_core::progress::ProgressState,
}

/// Run one preset to completion (or until `cancel` fires), streaming
/// parsed progress events onto `events_tx`.
///
/// `events_tx` uses `try_send`: a full channel means the TUI is already
/// behind, and dropping the event here is the documented backpressure
/// policy rather than blocking the child's stdout pump.
pub async fn run_child<C: Clock>(
    key: PresetKey,
    refresh: bool,
    save_events: bool,
    store: &Path,
    events_tx: mpsc::Sender<Event>,
    clock: C,
    cancel: CancellationToken,
) -> ChildOutcome {
    let emit = |kind: EventKind| {
        let _ = events_tx.try_send(Event::new(key.clone(), kind, clock.epoch_ms()));
    };

    let mut errors = Vec::new();

    let stdout_path = log_paths::stdout_log_path(store, &key);
    let stderr_path = log_paths::stderr_log_path(store, &key);
    let events_path = log_paths::events_log_path(store, &key);

    let mut stdout_log = match ChildLog::open(&stdout_path, &key.name) {
        Ok(log) => log,
        Err(e) => {
            errors.push(e);
            return ChildOutcome {
                key,
                status: ChildStatus::Failed,
                errors,
                progress: buildmux_core::progress::ProgressState::new(),
            };
        }
    };
    let mut events_log = match save_events
        .then(|| ChildLog::open(&events_path, &key.name))
        .transpose()
    {
        Ok(log) => log,
        Err(e) => {
            errors.push(e);
            return ChildOutcome {
                key,
                status: ChildStatus::Failed,
                errors,
                progress: buildmux_core::progress::ProgressState::new(),
            };
        }
    };

    let mut cmd = build_command(&key, refresh);
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(source) => {
            errors.push(RuntimeError::SpawnFailure {
                preset: key.name.clone(),
                source,
            });
            return ChildOutcome {
                key,
                status: ChildStatus::Failed,
                errors,
                progress: buildmux_core::progress::ProgressState::new(),
            };
        }
    };
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    if let Some(stderr) = stderr {
        let path = stderr_path.clone();
        let preset_name = key.name.clone();
        tokio::spawn(async move {
            if let Ok(mut log) = ChildLog::open(&path, &preset_name) {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let _ = log.write_line(&line);
                }
            }
        });
    }

    let mut lines = stdout.map(|s| BufReader::new(s).lines());
    let mut scan = ScanState::default();
    let mut pstate = buildmux_core::progress::ProgressState::new();
    let start_ms = clock.epoch_ms();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let status = loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                // Gate cancellation on liveness: an already-exited child
                // should not produce a spurious interrupt error.
                let mut context_err = "cancelled".to_string();
                if matches!(child.try_wait(), Ok(None)) {
                    if let Err(source) = child.start_kill() {
                        context_err = format!("cancelled: {source}");
                        errors.push(RuntimeError::CancelFailure {
                            preset: key.name.clone(),
                            source,
                        });
                    }
                }
                emit(EventKind::Exit { context_err: Some(context_err), wait_err: None });
                break ChildStatus::Cancelled;
            }

            line = next_line(&mut lines) => {
                match line {
                    Some(Ok(line)) => {
                        let _ = stdout_log.write_line(&line);
                        for line in scan.step(&line, &mut pstate) {
                            let event = Event::new(key.clone(), EventKind::Log { line }, clock.epoch_ms());
                            if let Some(log) = events_log.as_mut() {
                                let _ = log.write_line(&event.to_log_line());
                            }
                            let _ = events_tx.try_send(event);
                        }
                    }
                    Some(Err(source)) => {
                        emit(EventKind::Error { err: source.to_string() });
                        errors.push(RuntimeError::StreamIo {
                            preset: key.name.clone(),
                            source,
                        });
                    }
                    None => {
                        // Stdout closed: fall through to waiting on exit.
                        lines = None;
                    }
                }
            }

            _ = ticker.tick() => {
                emit(EventKind::Tick { elapsed_seconds: clock.epoch_ms().saturating_sub(start_ms) as f64 / 1000.0 });
            }

            wait = child.wait() => {
                let status = match wait {
                    Ok(status) => status,
                    Err(source) => {
                        let wait_err = source.to_string();
                        errors.push(RuntimeError::StreamIo {
                            preset: key.name.clone(),
                            source,
                        });
                        emit(EventKind::Exit { context_err: None, wait_err: Some(wait_err) });
                        break ChildStatus::Failed;
                    }
                };
                if status.success() {
                    emit(EventKind::Exit { context_err: None, wait_err: None });
                    break ChildStatus::Succeeded;
                }
                errors.push(RuntimeError::ChildExit {
                    preset: key.name.clone(),
                    code: status.code().unwrap_or(-1),
                });
                emit(EventKind::Exit {
                    context_err: None,
                    wait_err: Some(format!("exit status {}", status.code().unwrap_or(-1))),
                });
                break ChildStatus::Failed;
            }
        }
    };

    let _ = stdout_log.flush();
    if let Some(log) = events_log.as_mut() {
        let _ = log.flush();
    }

    ChildOutcome {
        key,
        status,
        errors,
        progress: pstate,
    }
}

/// Poll the next stdout line if the stream is still open, otherwise never
/// resolve — lets the `select!` fall through to the Waiter/Ticker arms.
async fn next_line(
    lines: &mut Option<tokio::io::Lines<BufReader<tokio::process::ChildStdout>>>,
) -> Option<std::io::Result<String>> {
    match lines {
        Some(l) => l.next_line().await.transpose(),
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildmux_core::preset::PresetKind;

    #[test]
    fn build_command_maps_kind_to_invocation() {
        let key = PresetKey::new("default", PresetKind::Build);
        let cmd = build_command(&key, true);
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "cmake");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(args, vec!["--build", "--preset", "default", "--fresh"]);
    }

    #[test]
    fn test_kind_uses_ctest() {
        let key = PresetKey::new("unit", PresetKind::Test);
        let cmd = build_command(&key, false);
        assert_eq!(cmd.as_std().get_program(), "ctest");
    }

    #[test]
    fn package_kind_uses_cpack() {
        let key = PresetKey::new("zip", PresetKind::Package);
        let cmd = build_command(&key, false);
        assert_eq!(cmd.as_std().get_program(), "cpack");
    }
}
