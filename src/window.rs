use crate::error::{ReportError, Result};
use crate::types::{Measurement, MeasurementSeries, ReportDate};
use chrono::{Duration, NaiveDateTime, NaiveTime, Weekday};
use log::debug;

/// Closed range of reporting minutes, `start <= t <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Monday-Thursday broadcast days close at 01:00, Friday-Sunday at 02:00.
pub fn end_hour_for(weekday: Weekday) -> i64 {
    match weekday {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => 1,
        Weekday::Fri | Weekday::Sat | Weekday::Sun => 2,
    }
}

impl BroadcastWindow {
    /// Window anchored at `start_hour` on the series' first calendar day. The closing
    /// hour follows the report date's weekday and its last minute is included.
    pub fn compute(first: NaiveDateTime, date: ReportDate, start_hour: u32) -> Self {
        let start = first.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(start_hour));
        let end = start.date().and_time(NaiveTime::MIN)
            + Duration::days(1)
            + Duration::hours(end_hour_for(date.weekday()))
            - Duration::minutes(1);
        Self { start, end }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Select the broadcast window of `series`. An empty selection is fatal.
pub fn select_window<'a>(
    series: &'a MeasurementSeries,
    date: ReportDate,
    start_hour: u32,
) -> Result<(BroadcastWindow, &'a [Measurement])> {
    let first = series.first_timestamp().ok_or_else(|| ReportError::Window {
        start: "-".to_string(),
        end: "-".to_string(),
    })?;

    let window = BroadcastWindow::compute(first, date, start_hour);
    let slice = series.between_inclusive(window.start, window.end);
    debug!(
        "Broadcast window {} .. {} holds {} records",
        window.start,
        window.end,
        slice.len()
    );

    if slice.is_empty() {
        return Err(ReportError::Window {
            start: window.start.format("%Y-%m-%d %H:%M").to_string(),
            end: window.end.format("%Y-%m-%d %H:%M").to_string(),
        });
    }
    Ok((window, slice))
}
