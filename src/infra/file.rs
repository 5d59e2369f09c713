use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::parser::parse_readings;
use crate::readings::{RawReadingSet, TimeRange};
use crate::services::ReadingSource;

/// Serves readings from a saved API payload on disk instead of the network.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReadingSource for FileSource {
    async fn fetch(&self, _device_id: &str, range: TimeRange) -> Result<RawReadingSet> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let readings = parse_readings(&bytes)?.within(&range);

        info!(path = %self.path.display(), count = readings.len(), "Readings loaded from file");
        Ok(readings)
    }
}
