// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `buildmux list` — print the preset catalog, optionally narrowed to one
//! kind, as a table or as names only.

use std::path::Path;

use anyhow::Result;
use buildmux_core::preset::KindFilter;
use clap::Args;

use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Restrict the listing to one preset kind, or `all` (the default).
    #[arg(value_name = "KIND", default_value = "all")]
    pub kind: KindFilter,

    /// Print preset names only, one per line — no kind, status, or table
    /// header. Handy for shell completion and scripting.
    #[arg(short = 'n', long = "names-only")]
    pub names_only: bool,
}

pub fn run(args: &ListArgs, root_dir: &Path, format: OutputFormat) -> Result<()> {
    let catalog = buildmux_catalog::load(root_dir, args.kind)?;

    if args.names_only {
        for info in catalog.values() {
            println!("{}", info.name);
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = catalog
                .values()
                .map(|info| {
                    serde_json::json!({
                        "name": info.name,
                        "displayName": info.display_name,
                        "kind": info.kind.as_str(),
                        "hidden": info.hidden,
                        "sourceFile": info.source_file.to_string_lossy(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("NAME"),
                Column::left("KIND"),
                Column::muted("DISPLAY NAME"),
            ]);
            for info in catalog.values() {
                table.row(vec![
                    info.name.clone(),
                    info.kind.as_str().to_string(),
                    info.display_name.clone(),
                ]);
            }
            let mut out = std::io::stdout().lock();
            table.render(&mut out);
            if catalog.is_empty() {
                eprintln!("no presets found");
            }
        }
    }

    Ok(())
}
