use crate::stats::rounded_means;
use crate::types::{MeasurementSeries, ReportRow, RowKind};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub const WHOLE_DAY_LABEL: &str = "Whole day";

/// Fixed 02:00 .. 01:59 (next day) range used for the day summary, whatever the weekday.
pub fn whole_day_bounds(base: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = base.and_time(NaiveTime::MIN) + Duration::hours(2);
    let end = start + Duration::days(1) - Duration::minutes(1);
    (start, end)
}

/// Whole-day average over the unfiltered series.
#[must_use]
pub fn whole_day_row(
    series: &MeasurementSeries,
    base: NaiveDate,
    precision: u32,
    label: &str,
) -> ReportRow {
    let (start, end) = whole_day_bounds(base);
    let records = series.between_inclusive(start, end);

    ReportRow {
        label: label.to_string(),
        kind: RowKind::WholeDay,
        values: rounded_means(records, series.channels().len(), precision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Measurement;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn series_from(start: &str, minutes: i64, f: impl Fn(NaiveDateTime) -> f64) -> MeasurementSeries {
        let start = ts(start);
        let records = (0..minutes)
            .map(|i| {
                let timestamp = start + Duration::minutes(i);
                Measurement {
                    timestamp,
                    values: vec![Some(f(timestamp)), None],
                }
            })
            .collect();
        MeasurementSeries::new(vec!["Digi 24".to_string(), "Antena 3 CNN".to_string()], records)
    }

    #[test]
    fn test_bounds() {
        let base = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        assert_eq!(
            whole_day_bounds(base),
            (ts("2026-01-30 02:00"), ts("2026-01-31 01:59"))
        );
    }

    #[test]
    fn test_constant_day() {
        let series = series_from("2026-01-30 02:00", 24 * 60, |_| 5.0);
        let row = whole_day_row(&series, NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(), 2, WHOLE_DAY_LABEL);
        assert_eq!(row.label, "Whole day");
        assert_eq!(row.kind, RowKind::WholeDay);
        assert_eq!(row.values, vec![Some(5.0), None]);
    }

    #[test]
    fn test_minutes_outside_fixed_range_are_ignored() {
        // series spans 00:00 .. 02:59 next day, values outside 02:00 .. 01:59 are outliers
        let base = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        let series = series_from("2026-01-30 00:00", 27 * 60, |t| {
            if t < ts("2026-01-30 02:00") || t > ts("2026-01-31 01:59") {
                100.0
            } else {
                1.0
            }
        });
        let row = whole_day_row(&series, base, 2, WHOLE_DAY_LABEL);
        assert_eq!(row.values[0], Some(1.0));
    }
}
