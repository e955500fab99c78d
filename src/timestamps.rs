use crate::table::RawRow;
use crate::types::{Measurement, MeasurementSeries, ReportDate};
use chrono::{NaiveDateTime, NaiveTime};
use log::{info, warn};

const CALENDAR_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Resolve one raw index value against the report date.
///
/// Accepts calendar-correct "YYYY-MM-DD HH:MM" strings (ISO "T" form included) as-is, and "HH:MM" strings
/// where hours 24 and above denote minutes after midnight of the same broadcast day.
/// Anything else yields `None`.
pub fn normalize_timestamp(raw: &str, date: ReportDate) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    for format in CALENDAR_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    let (h, m) = raw.split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;

    let (day, hour) = if hour >= 24 {
        (date.next_day(), hour - 24)
    } else {
        (date.date(), hour)
    };

    NaiveTime::from_hms_opt(hour, minute, 0).map(|t| day.and_time(t))
}

/// Re-index raw rows by absolute timestamp, dropping rows whose index cannot be parsed.
#[must_use]
pub fn normalize_rows(rows: Vec<RawRow>, channels: Vec<String>, date: ReportDate) -> MeasurementSeries {
    let total = rows.len();
    let mut dropped = 0;

    let records: Vec<Measurement> = rows
        .into_iter()
        .filter_map(|row| match normalize_timestamp(&row.index, date) {
            Some(timestamp) => Some(Measurement {
                timestamp,
                values: row.values,
            }),
            None => {
                warn!("Dropping row with unparseable time '{}'", row.index);
                dropped += 1;
                None
            }
        })
        .collect();

    let series = MeasurementSeries::new(channels, records);
    info!(
        "Loaded {} records for {} channels ({} of {} rows dropped)",
        series.len(),
        series.channels().len(),
        dropped,
        total
    );
    series
}
