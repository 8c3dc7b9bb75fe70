// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire schema for a single `CMakePresets.json`-shaped file.
//!
//! Only the fields buildmux cares about are modeled; unknown keys (e.g.
//! `cacheVariables`, `generator`, `condition`) are accepted and ignored by
//! `serde`'s default "unknown fields pass through as absent" behavior since
//! these structs don't use `deny_unknown_fields`.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPresetFile {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub configure_presets: Vec<RawPreset>,
    #[serde(default)]
    pub build_presets: Vec<RawPreset>,
    #[serde(default)]
    pub test_presets: Vec<RawPreset>,
    #[serde(default)]
    pub package_presets: Vec<RawPreset>,
    #[serde(default)]
    pub workflow_presets: Vec<RawPreset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreset {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}
