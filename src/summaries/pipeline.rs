use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Datelike, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::{PipelineConfig, object_key};
use crate::output::{print_json, write_json, write_table};
use crate::readings::TimeRange;
use crate::services::{Publisher, ReadingSource};
use crate::store;
use crate::summaries::calendar::{calendar_year, merge, rainfall_table, temperature_table};
use crate::summaries::climatology::climatology;
use crate::summaries::current::current_year;
use crate::summaries::hourly::rollup;
use crate::summaries::types::HourlySummary;

pub const TEMPERATURE_FILE: &str = "temperature_summary.csv";
pub const RAINFALL_FILE: &str = "rainfall_summary.csv";

/// Collaborators and settings for a single invocation.
pub struct Run<'a> {
    pub source: &'a dyn ReadingSource,
    pub publisher: Option<&'a dyn Publisher>,
    pub config: &'a PipelineConfig,
    pub device_id: &'a str,
    pub output_dir: &'a Path,
    pub key_prefix: &'a str,
}

/// What a daily run produced.
#[derive(Debug)]
pub struct DailyReport {
    pub fetched: usize,
    pub history: usize,
    pub climatology_days: usize,
    pub current_days: usize,
    pub rows: usize,
    pub temperature_path: PathBuf,
    pub rainfall_path: PathBuf,
    pub published: Vec<String>,
}

/// What an hourly run produced.
#[derive(Debug)]
pub struct HourlyReport {
    pub summary: HourlySummary,
    pub path: PathBuf,
    pub published: Option<String>,
}

impl Run<'_> {
    /// Merges fresh readings into the store and writes the calendar-aligned tables.
    ///
    /// A failed fetch aborts before anything is aggregated or written. An empty
    /// response still produces full-year tables with null columns.
    #[tracing::instrument(skip(self), fields(device = %self.device_id))]
    pub async fn daily(&self, store_path: &Path, now: DateTime<Utc>) -> Result<DailyReport> {
        let tz = &self.config.timezone;
        let range = TimeRange::year_to_date(now, tz)?;

        let history = store::load(store_path)?;
        let fetched = self
            .source
            .fetch(self.device_id, range)
            .await
            .context("failed to fetch current-year readings")?;
        let fetched_count = fetched.len();
        if fetched.is_empty() {
            warn!("Station returned no readings for the current year");
        }

        let merged = history.concat(fetched).normalize();
        store::save(store_path, &merged)?;

        let year = now.with_timezone(tz).year();
        let climatology = climatology(&merged, self.config);
        let current = current_year(&merged, year, self.config);
        let rows = merge(&calendar_year(year), &climatology, &current);

        info!(
            year,
            history = merged.len(),
            climatology_days = climatology.len(),
            current_days = current.len(),
            "Daily summaries computed"
        );

        let temperature_path = self.output_dir.join(TEMPERATURE_FILE);
        let rainfall_path = self.output_dir.join(RAINFALL_FILE);
        write_table(&temperature_path, &temperature_table(&rows))?;
        write_table(&rainfall_path, &rainfall_table(&rows))?;

        let mut published = Vec::new();
        for path in [&temperature_path, &rainfall_path] {
            if let Some(key) = self.publish_file(path, "text/csv").await {
                published.push(key);
            }
        }

        Ok(DailyReport {
            fetched: fetched_count,
            history: merged.len(),
            climatology_days: climatology.len(),
            current_days: current.len(),
            rows: rows.len(),
            temperature_path,
            rainfall_path,
            published,
        })
    }

    /// Reduces the UTC hour containing `hour` to one summary document.
    ///
    /// # Errors
    ///
    /// Fails when the fetch fails or the hour has no readings; nothing is
    /// written in either case.
    #[tracing::instrument(skip(self), fields(device = %self.device_id))]
    pub async fn hourly(&self, hour: DateTime<Utc>) -> Result<HourlyReport> {
        let window = TimeRange::hour_containing(hour);

        let readings = self
            .source
            .fetch(self.device_id, window)
            .await
            .context("failed to fetch hourly readings")?
            .normalize();

        let summary = rollup(&readings, window.start, self.config)?;
        print_json(&summary)?;

        let path = self
            .output_dir
            .join(self.config.hourly_file.file_name(window.start));
        write_json(&path, &summary)?;
        info!(path = %path.display(), "Hourly summary saved");

        let published = self.publish_file(&path, "application/json").await;

        Ok(HourlyReport {
            summary,
            path,
            published,
        })
    }

    /// Publishes a written artifact. Failures are logged, never returned.
    async fn publish_file(&self, path: &Path, content_type: &str) -> Option<String> {
        let publisher = self.publisher?;
        let file_name = path.file_name()?.to_string_lossy();
        let key = object_key(self.key_prefix, &file_name);

        let body = match tokio::fs::read(path).await {
            Ok(body) => body,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read artifact for upload");
                return None;
            }
        };

        match publisher.publish(Bytes::from(body), &key, content_type).await {
            Ok(written) => Some(written),
            Err(e) => {
                error!(key = %key, error = %e, "Failed to publish artifact");
                None
            }
        }
    }
}
