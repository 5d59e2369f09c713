use std::collections::BTreeMap;

use chrono::Datelike;

use crate::config::PipelineConfig;
use crate::readings::RawReadingSet;
use crate::stats::Summary;
use crate::summaries::types::ClimatologyRecord;

/// Aggregates every reading by (month, day) of its local date, across all years.
///
/// Temperatures are converted to °F after aggregation. Rainfall is averaged
/// in the station's raw unit and left unconverted so the historical column
/// matches previously published reports. Readings without rainfall do not
/// count toward that mean.
///
/// Returns one record per observed (month, day), ordered by month then day.
/// February 29 only appears when a leap year contributed readings.
pub fn climatology(readings: &RawReadingSet, config: &PipelineConfig) -> Vec<ClimatologyRecord> {
    let mut groups: BTreeMap<(u32, u32), (Summary, Summary)> = BTreeMap::new();

    for reading in readings.iter() {
        let date = reading.local_date(&config.timezone);
        let (temperature, rainfall) = groups.entry((date.month(), date.day())).or_default();

        if let Some(t) = reading.value(&config.temperature_metric) {
            temperature.push(t);
        }
        if let Some(r) = reading.value(&config.rainfall_metric) {
            rainfall.push(r);
        }
    }

    let temp = |value: Option<f64>| {
        config
            .conversions
            .convert(&config.temperature_metric, value)
    };

    groups
        .into_iter()
        .map(|((month, day), (temperature, rainfall))| ClimatologyRecord {
            month,
            day,
            hist_min: temp(temperature.min()),
            hist_max: temp(temperature.max()),
            hist_avg: temp(temperature.mean()),
            hist_avg_rainfall: rainfall.mean(),
        })
        .collect()
}
