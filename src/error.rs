//! Domain errors surfaced by the aggregation pipeline.

use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("no readings available for hour starting {0}")]
    NoReadingsForHour(DateTime<Utc>),
    #[error("failed to parse timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("unexpected readings payload: {0}")]
    InvalidPayload(String),
}
