use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::readings::RawReadingSet;

/// Running min/max/sum/count over a series of values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Summary {
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum / self.count as f64)
    }
}

impl Extend<f64> for Summary {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<f64> for Summary {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut s = Summary::default();
        s.extend(iter);
        s
    }
}

/// Min, max and mean of one metric over a local calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Groups readings by local date and summarizes `metric` for each date.
///
/// Every date with at least one reading gets an entry, even when none of
/// that date's readings carry `metric`.
pub fn daily_summaries(
    readings: &RawReadingSet,
    metric: &str,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Summary> {
    let mut days: BTreeMap<NaiveDate, Summary> = BTreeMap::new();
    for reading in readings.iter() {
        let day = days.entry(reading.local_date(tz)).or_default();
        if let Some(value) = reading.value(metric) {
            day.push(value);
        }
    }
    days
}

/// [`daily_summaries`] flattened into [`DailyStat`] rows, ascending by date.
pub fn daily_stats(readings: &RawReadingSet, metric: &str, tz: &Tz) -> Vec<DailyStat> {
    daily_summaries(readings, metric, tz)
        .into_iter()
        .map(|(date, s)| DailyStat {
            date,
            min: s.min(),
            max: s.max(),
            mean: s.mean(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::tests::reading;

    #[test]
    fn test_empty_summary() {
        let s = Summary::default();

        assert!(s.is_empty());
        assert_eq!(s.min(), None);
        assert_eq!(s.max(), None);
        assert_eq!(s.mean(), None);
        assert_eq!(s.sum(), 0.0);
    }

    #[test]
    fn test_summary_values() {
        let s: Summary = [3.0, -1.0, 4.0].into_iter().collect();

        assert_eq!(s.count(), 3);
        assert_eq!(s.min(), Some(-1.0));
        assert_eq!(s.max(), Some(4.0));
        assert_eq!(s.sum(), 6.0);
        assert_eq!(s.mean(), Some(2.0));
    }

    #[test]
    fn test_daily_stats_groups_by_local_date() {
        let tz = chrono_tz::US::Eastern;
        let set = RawReadingSet::new(vec![
            // 2025-06-01 22:00 local
            reading("2025-06-02T02:00:00Z", &[("temperature", 20.0)]),
            reading("2025-06-02T03:00:00Z", &[("temperature", 10.0)]),
            // 2025-06-02 local
            reading("2025-06-02T14:00:00Z", &[("temperature", 30.0)]),
        ]);

        let stats = daily_stats(&set, "temperature", &tz);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(stats[0].min, Some(10.0));
        assert_eq!(stats[0].max, Some(20.0));
        assert_eq!(stats[0].mean, Some(15.0));
        assert_eq!(stats[1].mean, Some(30.0));
    }

    #[test]
    fn test_daily_stats_keeps_dates_without_metric() {
        let tz = chrono_tz::UTC;
        let set = RawReadingSet::new(vec![reading("2025-06-02T12:00:00Z", &[("rainfall", 1.0)])]);

        let stats = daily_stats(&set, "temperature", &tz);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].mean, None);
    }
}
