use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::PipelineConfig;
use crate::error::WeatherError;
use crate::readings::{RawReadingSet, TimeRange};
use crate::summaries::types::HourlySummary;
use crate::units::MetricClass;

/// How sub-hourly values of one metric collapse into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Total accumulation over the hour.
    Sum,
    /// Peak observed value.
    Max,
    Mean,
}

impl Reducer {
    pub fn for_metric(metric: &str) -> Self {
        match MetricClass::of(metric) {
            MetricClass::Rainfall => Self::Sum,
            MetricClass::SolarRadiation => Self::Max,
            _ if metric.contains("gust") => Self::Max,
            _ => Self::Mean,
        }
    }

    pub fn reduce(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Self::Sum => Some(values.iter().sum()),
            Self::Max => values.iter().copied().reduce(f64::max),
            Self::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }
}

/// Reduces the readings of the UTC hour containing `hour` into one summary.
///
/// Only readings inside that hour are considered. Each configured metric is
/// reduced with its [`Reducer`], converted to US units and renamed per the
/// configured key naming. A metric with no values in the hour is `None`,
/// except rainfall which defaults to `0.0`.
///
/// # Errors
///
/// Returns [`WeatherError::NoReadingsForHour`] when no reading falls inside the hour.
pub fn rollup(
    readings: &RawReadingSet,
    hour: DateTime<Utc>,
    config: &PipelineConfig,
) -> Result<HourlySummary, WeatherError> {
    let window = TimeRange::hour_containing(hour);
    let in_hour = readings.within(&window);

    if in_hour.is_empty() {
        return Err(WeatherError::NoReadingsForHour(window.start));
    }

    let mut collected: HashMap<&str, Vec<f64>> = HashMap::new();
    for reading in in_hour.iter() {
        for (name, value) in &reading.metrics {
            if let Some(v) = value {
                collected.entry(name.as_str()).or_default().push(*v);
            }
        }
    }

    let values = config
        .hourly_metrics
        .iter()
        .map(|metric| {
            let reduced = collected
                .get(metric.as_str())
                .and_then(|values| Reducer::for_metric(metric).reduce(values));

            let value = match reduced {
                Some(v) => config.conversions.convert(metric, Some(v)),
                None if MetricClass::of(metric) == MetricClass::Rainfall => Some(0.0),
                None => None,
            };

            (config.key_naming.output_key(metric).to_string(), value)
        })
        .collect();

    Ok(HourlySummary {
        hour_start: window.start,
        values,
    })
}
