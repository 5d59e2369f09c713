//! Output formatting and persistence for published artifacts.
//!
//! Supports JSON logging, delimited tables, and the hourly JSON document.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs;
use std::path::Path;

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing any existing file.
///
/// The header row comes from the field names of `T`.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `value` as JSON with two-space indentation.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), "Writing JSON document");

    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
