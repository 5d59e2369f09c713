use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::summaries::types::{
    CalendarDay, ClimatologyRecord, CurrentYearRecord, MergedSummaryRow, RainfallRow,
    TemperatureRow,
};

/// Every day of `year`, Jan 1 through Dec 31.
pub fn calendar_year(year: i32) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| date.year() == year)
        .map(|date| CalendarDay {
            date,
            month: date.month(),
            day: date.day(),
        })
        .collect()
}

/// Left-joins the spine against climatology and then current-year records on (month, day).
///
/// Output follows the spine's order. A day keeps historical columns whenever
/// any year contributed that (month, day); current columns are `None` for
/// days without current-year readings, including every day after today.
pub fn merge(
    spine: &[CalendarDay],
    climatology: &[ClimatologyRecord],
    current: &[CurrentYearRecord],
) -> Vec<MergedSummaryRow> {
    let mut historical: HashMap<(u32, u32), ClimatologyRecord> = HashMap::new();
    for record in climatology {
        historical.entry((record.month, record.day)).or_insert(*record);
    }

    let mut observed: HashMap<(u32, u32), CurrentYearRecord> = HashMap::new();
    for record in current {
        observed
            .entry((record.date.month(), record.date.day()))
            .or_insert(*record);
    }

    spine
        .iter()
        .map(|day| MergedSummaryRow {
            day: *day,
            climatology: historical.get(&(day.month, day.day)).copied(),
            current: observed.get(&(day.month, day.day)).copied(),
        })
        .collect()
}

pub fn temperature_table(rows: &[MergedSummaryRow]) -> Vec<TemperatureRow> {
    rows.iter().map(MergedSummaryRow::temperature_row).collect()
}

pub fn rainfall_table(rows: &[MergedSummaryRow]) -> Vec<RainfallRow> {
    rows.iter().map(MergedSummaryRow::rainfall_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hist(month: u32, day: u32, avg: f64) -> ClimatologyRecord {
        ClimatologyRecord {
            month,
            day,
            hist_min: Some(avg - 5.0),
            hist_max: Some(avg + 5.0),
            hist_avg: Some(avg),
            hist_avg_rainfall: Some(0.2),
        }
    }

    fn cur(date: NaiveDate, daily: f64, total: f64) -> CurrentYearRecord {
        CurrentYearRecord {
            date,
            cur_min: Some(40.0),
            cur_max: Some(60.0),
            cur_avg: Some(50.0),
            daily_rainfall: daily,
            running_total: total,
        }
    }

    #[test]
    fn test_calendar_year_lengths() {
        assert_eq!(calendar_year(2023).len(), 365);
        assert_eq!(calendar_year(2024).len(), 366);
        assert_eq!(calendar_year(2100).len(), 365);
    }

    #[test]
    fn test_calendar_year_bounds() {
        let days = calendar_year(2025);

        assert_eq!(days.first().unwrap().date, date(2025, 1, 1));
        assert_eq!(days.last().unwrap().date, date(2025, 12, 31));
        assert_eq!((days[59].month, days[59].day), (3, 1));
    }

    #[test]
    fn test_merge_with_empty_inputs_keeps_full_spine() {
        let rows = merge(&calendar_year(2024), &[], &[]);

        assert_eq!(rows.len(), 366);
        assert!(rows.iter().all(|r| r.climatology.is_none() && r.current.is_none()));
    }

    #[test]
    fn test_merge_left_joins_in_spine_order() {
        let spine = calendar_year(2025);
        let climatology = vec![hist(12, 31, 30.0), hist(1, 2, 31.0)];
        let current = vec![
            cur(date(2025, 1, 1), 0.1, 0.1),
            cur(date(2025, 1, 3), 0.2, 0.30000000000000004),
        ];

        let rows = merge(&spine, &climatology, &current);

        assert_eq!(rows.len(), 365);
        assert_eq!(rows[0].day.date, date(2025, 1, 1));
        assert!(rows[0].climatology.is_none());
        assert_eq!(rows[0].current.unwrap().daily_rainfall, 0.1);

        assert_eq!(rows[1].climatology.unwrap().hist_avg, Some(31.0));
        assert!(rows[1].current.is_none());

        assert_eq!(rows[2].current.unwrap().daily_rainfall, 0.2);
        assert_eq!(rows[364].climatology.unwrap().hist_avg, Some(30.0));
        assert!(rows[364].current.is_none());
    }

    #[test]
    fn test_leap_day_history_dropped_in_common_year() {
        let rows = merge(&calendar_year(2025), &[hist(2, 29, 40.0)], &[]);

        assert!(rows.iter().all(|r| r.climatology.is_none()));
    }

    #[test]
    fn test_leap_day_history_joined_in_leap_year() {
        let rows = merge(&calendar_year(2024), &[hist(2, 29, 40.0)], &[]);

        let leap = rows.iter().find(|r| r.day.date == date(2024, 2, 29)).unwrap();
        assert_eq!(leap.climatology.unwrap().hist_avg, Some(40.0));
    }

    #[test]
    fn test_tables_project_columns() {
        let rows = merge(
            &calendar_year(2025),
            &[hist(1, 1, 30.0)],
            &[cur(date(2025, 1, 1), 0.4, 0.4)],
        );

        let temps = temperature_table(&rows);
        let rain = rainfall_table(&rows);

        assert_eq!(temps.len(), 365);
        assert_eq!(temps[0].hist_min_temp, Some(25.0));
        assert_eq!(temps[0].cur_avg_temp, Some(50.0));
        assert_eq!(temps[1].cur_avg_temp, None);
        assert_eq!(rain[0].hist_avg_rainfall, Some(0.2));
        assert_eq!(rain[0].running_total, Some(0.4));
        assert_eq!(rain[1].daily_rainfall, None);
    }
}
