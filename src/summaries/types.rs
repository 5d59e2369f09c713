//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Historical norms for one (month, day) pair across every recorded year.
///
/// Temperatures are in °F; `hist_avg_rainfall` stays in the station's raw unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimatologyRecord {
    pub month: u32,
    pub day: u32,
    pub hist_min: Option<f64>,
    pub hist_max: Option<f64>,
    pub hist_avg: Option<f64>,
    pub hist_avg_rainfall: Option<f64>,
}

/// Observed values for one date of the current year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentYearRecord {
    pub date: NaiveDate,
    pub cur_min: Option<f64>,
    pub cur_max: Option<f64>,
    pub cur_avg: Option<f64>,
    pub daily_rainfall: f64,
    pub running_total: f64,
}

/// One day of the calendar spine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub month: u32,
    pub day: u32,
}

/// A calendar day joined with whatever historical and current data exists for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedSummaryRow {
    pub day: CalendarDay,
    pub climatology: Option<ClimatologyRecord>,
    pub current: Option<CurrentYearRecord>,
}

/// A row of `temperature_summary.csv`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemperatureRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub hist_min_temp: Option<f64>,
    pub hist_max_temp: Option<f64>,
    pub hist_avg_temp: Option<f64>,
    pub cur_min_temp: Option<f64>,
    pub cur_max_temp: Option<f64>,
    pub cur_avg_temp: Option<f64>,
}

/// A row of `rainfall_summary.csv`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RainfallRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub hist_avg_rainfall: Option<f64>,
    pub daily_rainfall: Option<f64>,
    pub running_total: Option<f64>,
}

impl MergedSummaryRow {
    pub fn temperature_row(&self) -> TemperatureRow {
        let hist = self.climatology.as_ref();
        let cur = self.current.as_ref();
        TemperatureRow {
            date: self.day.date,
            hist_min_temp: hist.and_then(|h| h.hist_min),
            hist_max_temp: hist.and_then(|h| h.hist_max),
            hist_avg_temp: hist.and_then(|h| h.hist_avg),
            cur_min_temp: cur.and_then(|c| c.cur_min),
            cur_max_temp: cur.and_then(|c| c.cur_max),
            cur_avg_temp: cur.and_then(|c| c.cur_avg),
        }
    }

    pub fn rainfall_row(&self) -> RainfallRow {
        RainfallRow {
            date: self.day.date,
            hist_avg_rainfall: self.climatology.and_then(|h| h.hist_avg_rainfall),
            daily_rainfall: self.current.map(|c| c.daily_rainfall),
            running_total: self.current.map(|c| c.running_total),
        }
    }
}

/// One hour of readings reduced to a single record.
///
/// Serializes as a flat object: `timestamp` first, then each metric in the
/// configured order. Absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySummary {
    pub hour_start: DateTime<Utc>,
    pub values: Vec<(String, Option<f64>)>,
}

impl HourlySummary {
    /// Zero-padded UTC form, e.g. `2025-06-01T09:00:00Z`.
    pub fn timestamp(&self) -> String {
        self.hour_start.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| *value)
    }
}

impl Serialize for HourlySummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("timestamp", &self.timestamp())?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
