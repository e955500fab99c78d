use crate::error::{ReportError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Calendar date a broadcast day describes. Derived once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Extract the date from a source file name such as
    /// "Digi 24-audiente zilnice la minut 2026-01-30.xlsx" or "2026-01-30.json".
    pub fn from_filename(name: &str) -> Result<Self> {
        let file_name = Path::new(name)
            .file_name()
            .map_or_else(|| name.to_string(), |n| n.to_string_lossy().to_string());

        let token = file_name
            .split_whitespace()
            .last()
            .ok_or_else(|| ReportError::Parse(format!("No date in file name '{name}'")))?;
        let date_str = token.split('.').next().unwrap_or(token);

        date_str
            .parse()
            .map_err(|_| ReportError::Parse(format!("No date in file name '{name}'")))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn next_day(self) -> NaiveDate {
        self.0 + Duration::days(1)
    }

    pub fn at(self, hour: u32, minute: u32) -> Option<NaiveDateTime> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|t| self.0.and_time(t))
    }
}

impl FromStr for ReportDate {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| ReportError::Parse(format!("Invalid report date '{s}': {e}")))
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One minute of measurements; `values` is aligned with the series' channel list.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Per-minute ratings, strictly increasing by timestamp. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    channels: Vec<String>,
    records: Vec<Measurement>,
}

impl MeasurementSeries {
    /// Builds a series, sorting by timestamp and keeping the first record of any duplicate minute.
    pub fn new(channels: Vec<String>, mut records: Vec<Measurement>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        records.dedup_by_key(|r| r.timestamp);
        Self { channels, records }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|r| r.timestamp)
    }

    /// Records with `start <= timestamp < end`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Measurement] {
        let lo = self.records.partition_point(|r| r.timestamp < start);
        let hi = self.records.partition_point(|r| r.timestamp < end);
        if lo >= hi {
            return &[];
        }
        &self.records[lo..hi]
    }

    /// Records with `start <= timestamp <= end`.
    pub fn between_inclusive(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Measurement] {
        self.between(start, end + Duration::nanoseconds(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Interval,
    Slot,
    WholeDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub label: String,
    pub kind: RowKind,
    pub values: Vec<Option<f64>>,
}

impl ReportRow {
    /// Largest present value in the row, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().flatten().copied().reduce(f64::max)
    }
}
