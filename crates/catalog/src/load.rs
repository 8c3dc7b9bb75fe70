// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive catalog loader.
//!
//! Grounded on the import-resolution pipeline in `runbook/src/import.rs`:
//! read a file, fold its entries into the target, then descend into each
//! referenced file in array order. The entry-map conflict rule there is
//! "local wins, warn"; here, per the upstream build tool's own semantics,
//! it's simpler — last-seen-wins, no warnings, since an `include` is a
//! textual splice rather than a namespaced import.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use buildmux_core::preset::{KindFilter, PresetCatalog, PresetInfo, PresetKey, PresetKind};

use crate::error::CatalogError;
use crate::raw::{RawPreset, RawPresetFile};

/// Read cap per preset file. Oversize files fail closed rather than being
/// silently truncated and handed to a JSON decoder that would fail anyway.
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Load the preset catalog rooted at `root_dir`.
///
/// Prefers `CMakeUserPresets.json` over `CMakePresets.json` at the root,
/// matching the upstream build tool's own precedence. `filter` narrows the
/// result to a single kind, or passes everything through for
/// [`KindFilter::All`].
pub fn load(root_dir: &Path, filter: KindFilter) -> Result<PresetCatalog, CatalogError> {
    let entry = entry_file(root_dir)?;

    let mut catalog = PresetCatalog::new();
    let mut visited = HashSet::new();
    load_file(&entry, &mut catalog, &mut visited)?;

    if matches!(filter, KindFilter::All) {
        return Ok(catalog);
    }
    Ok(catalog
        .into_iter()
        .filter(|(key, _)| filter.matches(key.kind))
        .collect())
}

fn entry_file(root_dir: &Path) -> Result<PathBuf, CatalogError> {
    let user = root_dir.join("CMakeUserPresets.json");
    if user.is_file() {
        return Ok(user);
    }
    let base = root_dir.join("CMakePresets.json");
    if base.is_file() {
        return Ok(base);
    }
    Err(CatalogError::NoPresetFile(root_dir.to_path_buf()))
}

fn load_file(
    path: &Path,
    catalog: &mut PresetCatalog,
    visited: &mut HashSet<PathBuf>,
) -> Result<(), CatalogError> {
    let canonical = path.canonicalize().map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !visited.insert(canonical.clone()) {
        // Already visited: skip rather than error, so include cycles
        // terminate instead of blowing the stack.
        return Ok(());
    }

    let raw = read_capped(path)?;
    let file: RawPresetFile = serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    insert_kind(catalog, path, PresetKind::Configure, &file.configure_presets);
    insert_kind(catalog, path, PresetKind::Build, &file.build_presets);
    insert_kind(catalog, path, PresetKind::Test, &file.test_presets);
    insert_kind(catalog, path, PresetKind::Package, &file.package_presets);
    insert_kind(catalog, path, PresetKind::Workflow, &file.workflow_presets);

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    for include in &file.include {
        let included = parent.join(include);
        if !included.is_file() {
            return Err(CatalogError::InvalidInclude {
                from: path.to_path_buf(),
                included,
            });
        }
        load_file(&included, catalog, visited)?;
    }

    Ok(())
}

fn insert_kind(catalog: &mut PresetCatalog, source_file: &Path, kind: PresetKind, presets: &[RawPreset]) {
    for preset in presets {
        let key = PresetKey::new(preset.name.clone(), kind);
        let info = PresetInfo {
            name: preset.name.clone(),
            display_name: preset
                .display_name
                .clone()
                .unwrap_or_else(|| "-UNKNOWN-".to_string()),
            hidden: preset.hidden,
            source_file: source_file.to_path_buf(),
            kind,
        };
        // BTreeMap::insert overwrites on key collision: last-seen-wins,
        // applied in file-visit order (root entries first, then each
        // include in array order, depth-first).
        catalog.insert(key, info);
    }
}

fn read_capped(path: &Path) -> Result<String, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut limited = file.take(MAX_FILE_BYTES + 1);
    let mut buf = Vec::new();
    limited
        .read_to_end(&mut buf)
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if buf.len() as u64 > MAX_FILE_BYTES {
        return Err(CatalogError::FileTooLarge {
            path: path.to_path_buf(),
            limit_bytes: MAX_FILE_BYTES,
        });
    }
    String::from_utf8(buf).map_err(|err| CatalogError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod tests;
