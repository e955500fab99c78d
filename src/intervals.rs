use crate::stats::rounded_means;
use crate::types::{Measurement, ReportRow, RowKind};
use chrono::{Duration, NaiveDateTime, Timelike};

pub const INTERVAL_MINUTES: i64 = 15;

/// One 15-minute bucket `[start, start + 15min)` with rounded channel means.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRow {
    pub start: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl IntervalRow {
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(INTERVAL_MINUTES)
    }

    /// "HH:MM - HH:MM"
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end().format("%H:%M"))
    }

    pub fn to_report_row(&self) -> ReportRow {
        ReportRow {
            label: self.label(),
            kind: RowKind::Interval,
            values: self.values.clone(),
        }
    }
}

/// Start of the quarter hour containing `ts`.
pub fn bucket_start(ts: NaiveDateTime) -> NaiveDateTime {
    let minute = ts.minute() - ts.minute() % INTERVAL_MINUTES as u32;
    ts.with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Resample an ordered window into quarter-hour buckets. Empty buckets are not emitted.
#[must_use]
pub fn aggregate_intervals(
    window: &[Measurement],
    channel_count: usize,
    precision: u32,
) -> Vec<IntervalRow> {
    let mut rows = Vec::new();
    let mut rest = window;

    while let Some(first) = rest.first() {
        let start = bucket_start(first.timestamp);
        let end = start + Duration::minutes(INTERVAL_MINUTES);
        let len = rest.partition_point(|r| r.timestamp < end);
        let (bucket, tail) = rest.split_at(len);

        rows.push(IntervalRow {
            start,
            values: rounded_means(bucket, channel_count, precision),
        });
        rest = tail;
    }

    rows
}
