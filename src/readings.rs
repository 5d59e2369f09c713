//! Timestamped station readings and the normalizer that makes a set canonical.
//!
//! A [`RawReadingSet`] may hold a previously persisted history concatenated
//! with freshly fetched readings. [`RawReadingSet::normalize`] drops repeated
//! timestamps (first occurrence wins) and sorts ascending, after which every
//! timestamp in the set is unique.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::WeatherError;

/// Metric name to value. `None` marks a metric the station reported without a value.
pub type Metrics = BTreeMap<String, Option<f64>>;

/// Column name to raw text, for store cells that are not numbers.
pub type Attributes = BTreeMap<String, String>;

/// A single station observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub metrics: Metrics,
    /// Non-numeric cells carried through from the historical store untouched.
    pub attributes: Attributes,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, metrics: Metrics) -> Self {
        Self {
            timestamp,
            metrics,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the value for `metric`, treating a missing key and an explicit null alike.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied().flatten()
    }

    /// Calendar date of this reading in the reference timezone.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }
}

/// Ordered collection of readings. Only canonical after [`normalize`](Self::normalize).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReadingSet {
    readings: Vec<Reading>,
}

impl RawReadingSet {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }

    /// Appends `other` after the readings already held, preserving both orders.
    pub fn concat(mut self, other: RawReadingSet) -> Self {
        self.readings.extend(other.readings);
        self
    }

    /// Removes repeated timestamps, keeping the first occurrence, then sorts ascending.
    ///
    /// A later reading at an identical instant is discarded, not merged.
    pub fn normalize(self) -> Self {
        let mut seen = HashSet::with_capacity(self.readings.len());
        let mut readings: Vec<Reading> = self
            .readings
            .into_iter()
            .filter(|r| seen.insert(r.timestamp))
            .collect();
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    /// Readings whose timestamp falls inside `range`.
    pub fn within(&self, range: &TimeRange) -> Self {
        self.readings
            .iter()
            .filter(|r| range.contains(r.timestamp))
            .cloned()
            .collect()
    }

    /// Every metric name that appears in at least one reading.
    pub fn metric_names(&self) -> BTreeSet<String> {
        self.readings
            .iter()
            .flat_map(|r| r.metrics.keys().cloned())
            .collect()
    }

    /// Every metric and attribute name that appears in at least one reading.
    pub fn column_names(&self) -> BTreeSet<String> {
        self.readings
            .iter()
            .flat_map(|r| r.metrics.keys().chain(r.attributes.keys()).cloned())
            .collect()
    }
}

impl FromIterator<Reading> for RawReadingSet {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for RawReadingSet {
    type Item = Reading;
    type IntoIter = std::vec::IntoIter<Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.into_iter()
    }
}

/// Half-open interval `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// The UTC hour that contains `instant`.
    pub fn hour_containing(instant: DateTime<Utc>) -> Self {
        let start = floor_to_hour(instant);
        Self::new(start, start + Duration::hours(1))
    }

    /// From local midnight on Jan 1 of `now`'s year (in `tz`) up to `now`.
    pub fn year_to_date(now: DateTime<Utc>, tz: &Tz) -> Result<Self, WeatherError> {
        let year = now.with_timezone(tz).year();
        let start = tz
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .earliest()
            .ok_or_else(|| WeatherError::InvalidTimestamp(format!("{year}-01-01 in {tz}")))?;
        Ok(Self::new(start.with_timezone(&Utc), now))
    }
}

/// Truncates an instant to the start of its UTC hour.
pub fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(instant)
}

/// Parses a reading timestamp and converts it to UTC.
///
/// Accepts RFC 3339 (`2025-06-01T09:05:00-04:00`), the space-separated form
/// pandas writes (`2025-06-01 09:05:00-04:00`), and naive timestamps, which
/// are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, WeatherError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Ok(ts.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(WeatherError::InvalidTimestamp(raw.to_string()))
}
