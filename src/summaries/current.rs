use chrono::Datelike;

use crate::config::PipelineConfig;
use crate::readings::RawReadingSet;
use crate::stats::{Summary, daily_stats, daily_summaries};
use crate::summaries::types::CurrentYearRecord;

/// Per-date statistics for readings whose local date falls in `year`.
///
/// Temperatures are converted to °F. Rainfall is summed per date (a reading
/// without rainfall counts as zero) and converted with the configured rainfall
/// unit; `running_total` is the prefix sum of those converted daily values.
///
/// Dates without readings are left out rather than zero-filled.
pub fn current_year(
    readings: &RawReadingSet,
    year: i32,
    config: &PipelineConfig,
) -> Vec<CurrentYearRecord> {
    let tz = &config.timezone;
    let rainfall = daily_summaries(readings, &config.rainfall_metric, tz);

    let conversions = &config.conversions;
    let temp = |value: Option<f64>| conversions.convert(&config.temperature_metric, value);

    let mut running_total = 0.0;
    daily_stats(readings, &config.temperature_metric, tz)
        .into_iter()
        .filter(|stat| stat.date.year() == year)
        .map(|stat| {
            let raw = rainfall.get(&stat.date).map_or(0.0, Summary::sum);
            let daily_rainfall = conversions
                .convert(&config.rainfall_metric, Some(raw))
                .unwrap_or(0.0);
            running_total += daily_rainfall;

            CurrentYearRecord {
                date: stat.date,
                cur_min: temp(stat.min),
                cur_max: temp(stat.max),
                cur_avg: temp(stat.mean),
                daily_rainfall,
                running_total,
            }
        })
        .collect()
}
