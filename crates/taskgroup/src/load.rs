// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads `cmexlconf.json` and resolves a task name to its ordered list of
//! `workflow` preset names.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TaskGroupError;

/// One entry in the `tasks` array: a name plus the ordered workflow
/// presets it expands to.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDef {
    pub name: String,
    #[serde(default)]
    pub workflows: Vec<String>,
}

/// The subset of `cmexlconf.json` the core reads. `init_settings` is
/// accepted (so a well-formed config doesn't fail to parse) but otherwise
/// ignored, per spec: "only `tasks` is read by the core".
#[derive(Debug, Default, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub init_settings: serde_json::Value,
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
}

const CONFIG_FILE_NAME: &str = "cmexlconf.json";

fn config_path(root_dir: &Path, store_dir_name: &str) -> Option<PathBuf> {
    let direct = root_dir.join(CONFIG_FILE_NAME);
    if direct.is_file() {
        return Some(direct);
    }
    let in_store = root_dir.join(format!(".{store_dir_name}")).join(CONFIG_FILE_NAME);
    if in_store.is_file() {
        return Some(in_store);
    }
    None
}

fn load_config(root_dir: &Path, store_dir_name: &str) -> Result<TaskConfig, TaskGroupError> {
    let path = config_path(root_dir, store_dir_name)
        .ok_or_else(|| TaskGroupError::NoConfigFile(root_dir.to_path_buf()))?;
    let raw = std::fs::read_to_string(&path).map_err(|source| TaskGroupError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| TaskGroupError::Json { path, source })
}

/// Resolve `task_name` against `cmexlconf.json` (looked up in `root_dir`
/// or `root_dir/.<store_dir_name>/`), returning its ordered workflow
/// preset names. An unknown task name is a fatal user error.
pub fn resolve(
    root_dir: &Path,
    store_dir_name: &str,
    task_name: &str,
) -> Result<Vec<String>, TaskGroupError> {
    let config = load_config(root_dir, store_dir_name)?;
    config
        .tasks
        .into_iter()
        .find(|t| t.name == task_name)
        .map(|t| t.workflows)
        .ok_or_else(|| TaskGroupError::UnknownTask(task_name.to_string()))
}
