//! Writing finished runs to the export directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use horizon_config::ExportSettings;
use horizon_core::{SimulationRun, export};
use horizon_utils::{AtomicWriteOptions, atomic_write_with_options};

/// Same-second exports get a numeric suffix, up to this many.
const MAX_SUFFIX: u32 = 99;

#[must_use]
pub fn export_file_stem(at: DateTime<Local>) -> String {
    at.format("eventhorizon_%Y%m%d_%H%M%S").to_string()
}

/// Render `run` and write it under `settings.directory`, never overwriting an
/// existing file.
pub fn write_export(
    run: &SimulationRun,
    settings: &ExportSettings,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    let body = export::render(run, settings.format)?;
    fs::create_dir_all(&settings.directory).with_context(|| {
        format!(
            "failed to create export directory {}",
            settings.directory.display()
        )
    })?;

    let stem = export_file_stem(at);
    let ext = settings.format.extension();
    for suffix in 0..=MAX_SUFFIX {
        let name = if suffix == 0 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}_{suffix}.{ext}")
        };
        let path = settings.directory.join(name);
        match write_new(&path, body.as_bytes()) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to write {}", path.display()));
            }
        }
    }
    anyhow::bail!(
        "too many exports named {stem} in {}",
        settings.directory.display()
    )
}

fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, AtomicWriteOptions::create_new())
}
