//! Persisted historical readings store.
//!
//! A delimited file with a `timestamp` column followed by one column per
//! metric. Read once at the start of a daily run and rewritten after the
//! fresh fetch has been merged in. Cells that are not numbers (a device id,
//! a pandas `date` column) are kept as text and written back unchanged.

use anyhow::{Context, Result, anyhow};
use chrono::SecondsFormat;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::readings::{Attributes, Metrics, RawReadingSet, Reading, parse_timestamp};

const TIMESTAMP_COLUMN: &str = "timestamp";

/// Loads the store at `path`. A missing file means no prior history.
pub fn load(path: &Path) -> Result<RawReadingSet> {
    if !path.exists() {
        info!(path = %path.display(), "No historical store found, starting empty");
        return Ok(RawReadingSet::default());
    }

    let mut rdr = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to open store {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    let ts_index = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or_else(|| anyhow!("store {} has no '{TIMESTAMP_COLUMN}' column", path.display()))?;

    let mut readings = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_ts = record.get(ts_index).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts)
            .with_context(|| format!("store {} row {}", path.display(), line + 1))?;

        let mut metrics = Metrics::new();
        let mut attributes = Attributes::new();
        for (i, (name, cell)) in headers.iter().zip(record.iter()).enumerate() {
            if i == ts_index {
                continue;
            }
            match parse_cell(cell) {
                Cell::Empty => {
                    metrics.insert(name.to_string(), None);
                }
                Cell::Number(v) => {
                    metrics.insert(name.to_string(), Some(v));
                }
                Cell::Text(text) => {
                    attributes.insert(name.to_string(), text.to_string());
                }
            }
        }

        readings.push(Reading::new(timestamp, metrics).with_attributes(attributes));
    }

    debug!(path = %path.display(), rows = readings.len(), "Historical store loaded");
    Ok(RawReadingSet::new(readings))
}

/// Writes `readings` to `path`, replacing any previous contents.
///
/// Columns are `timestamp` followed by every metric and attribute name in
/// sorted order. Absent values are written as empty cells.
pub fn save(path: &Path, readings: &RawReadingSet) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let columns: Vec<String> = readings.column_names().into_iter().collect();
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create store {}", path.display()))?;

    writer.write_record(
        std::iter::once(TIMESTAMP_COLUMN).chain(columns.iter().map(String::as_str)),
    )?;

    for reading in readings.iter() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(reading.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        for name in &columns {
            let cell = match reading.value(name) {
                Some(v) => v.to_string(),
                None => reading.attributes.get(name).cloned().unwrap_or_default(),
            };
            row.push(cell);
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = readings.len(), "Historical store written");
    Ok(())
}

enum Cell<'a> {
    Empty,
    Number(f64),
    Text(&'a str),
}

fn parse_cell(raw: &str) -> Cell<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Text(raw),
    }
}
