use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use std::time::Duration;
use tracing::{debug, info};

use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_readings;
use crate::readings::{RawReadingSet, TimeRange};
use crate::services::ReadingSource;

/// Weather station observations from the RealmFive API.
pub struct RealmFiveClient<C = BasicClient> {
    base_url: String,
    http: ApiKey<C>,
}

impl RealmFiveClient<BasicClient> {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Self::with_client(BasicClient::with_client(client), base_url, api_key)
    }
}

impl<C: HttpClient> RealmFiveClient<C> {
    pub fn with_client(client: C, base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: ApiKey::x_api_key(client, api_key)?,
        })
    }

    fn observations_url(&self, device_id: &str, range: &TimeRange) -> Result<reqwest::Url> {
        let url = format!(
            "{}/api/v2/weather_stations/observations/{}",
            self.base_url, device_id
        );
        let after = range.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let before = range.end.to_rfc3339_opts(SecondsFormat::Secs, true);

        reqwest::Url::parse_with_params(
            &url,
            &[("occurred_after", after), ("occurred_before", before)],
        )
        .with_context(|| format!("invalid observations URL '{url}'"))
    }
}

#[async_trait]
impl<C: HttpClient> ReadingSource for RealmFiveClient<C> {
    #[tracing::instrument(skip(self, range), fields(start = %range.start, end = %range.end))]
    async fn fetch(&self, device_id: &str, range: TimeRange) -> Result<RawReadingSet> {
        let url = self.observations_url(device_id, &range)?;
        debug!(url = %url, "Requesting station observations");

        let bytes = fetch_bytes(&self.http, url)
            .await
            .context("station observations request failed")?;
        let readings = parse_readings(&bytes).context("failed to decode station observations")?;

        info!(count = readings.len(), "Station readings fetched");
        Ok(readings)
    }
}
