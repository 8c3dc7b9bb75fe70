// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preset identity and catalog types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The five preset kinds a build-tool configuration file can define.
///
/// Ordering is declaration order (`Configure < Build < Test < Package <
/// Workflow`). The source format has no notion of kind ordering beyond
/// "lexicographic on name then kind", so this fixed order stands in for
/// a total order over the closed kind set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetKind {
    Configure,
    Build,
    Test,
    Package,
    Workflow,
}

impl PresetKind {
    pub const ALL: [PresetKind; 5] = [
        PresetKind::Configure,
        PresetKind::Build,
        PresetKind::Test,
        PresetKind::Package,
        PresetKind::Workflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetKind::Configure => "configure",
            PresetKind::Build => "build",
            PresetKind::Test => "test",
            PresetKind::Package => "package",
            PresetKind::Workflow => "workflow",
        }
    }
}

impl std::fmt::Display for PresetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "configure" => Ok(PresetKind::Configure),
            "build" => Ok(PresetKind::Build),
            "test" => Ok(PresetKind::Test),
            "package" => Ok(PresetKind::Package),
            "workflow" => Ok(PresetKind::Workflow),
            other => Err(format!("unknown preset kind: {other}")),
        }
    }
}

/// A CLI-facing filter over kinds: a single kind, or the `all` wildcard.
///
/// `All` is never persisted as a [`PresetKind`] value — it only exists at
/// query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Kind(PresetKind),
    All,
}

impl KindFilter {
    pub fn matches(&self, kind: PresetKind) -> bool {
        match self {
            KindFilter::Kind(k) => *k == kind,
            KindFilter::All => true,
        }
    }
}

impl std::str::FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(KindFilter::All),
            "configure" => Ok(KindFilter::Kind(PresetKind::Configure)),
            "build" => Ok(KindFilter::Kind(PresetKind::Build)),
            "test" => Ok(KindFilter::Kind(PresetKind::Test)),
            "package" => Ok(KindFilter::Kind(PresetKind::Package)),
            "workflow" => Ok(KindFilter::Kind(PresetKind::Workflow)),
            other => Err(format!("unknown preset kind: {other}")),
        }
    }
}

/// Identity of a preset within a catalog: its name plus kind, since the
/// same name may appear once per kind (e.g. a `default` configure preset
/// and a `default` build preset are distinct entries).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PresetKey {
    pub name: String,
    pub kind: PresetKind,
}

impl PresetKey {
    pub fn new(name: impl Into<String>, kind: PresetKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl std::fmt::Display for PresetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// A loaded preset definition. Immutable after catalog load: no `&mut`
/// accessors are exposed once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: String,
    pub display_name: String,
    pub hidden: bool,
    pub source_file: PathBuf,
    pub kind: PresetKind,
}

impl PresetInfo {
    pub fn key(&self) -> PresetKey {
        PresetKey::new(self.name.clone(), self.kind)
    }
}

/// An ordered catalog of presets, keyed by `(name, kind)`.
///
/// A `BTreeMap` gives deterministic iteration order for `buildmux list`
/// output and for the TUI's pre-sorted row order, without reaching for an
/// extra insertion-order map type.
pub type PresetCatalog = BTreeMap<PresetKey, PresetInfo>;
