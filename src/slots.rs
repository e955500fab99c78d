use crate::error::{ReportError, Result};
use crate::intervals::IntervalRow;
use crate::stats::rounded_means;
use crate::types::{MeasurementSeries, ReportDate, ReportRow, RowKind};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const SLOT_LABEL_PREFIX: &str = "MEDIE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayPattern {
    MondayToThursday,
    Friday,
    SaturdaySunday,
}

impl WeekdayPattern {
    pub fn for_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => Self::MondayToThursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat | Weekday::Sun => Self::SaturdaySunday,
        }
    }
}

/// A named daypart such as prime time; `next_day` places the bounds after midnight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotDefinition {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub next_day: bool,
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

impl SlotDefinition {
    pub fn new(start_time: &str, end_time: &str, next_day: bool) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            next_day,
        }
    }

    pub fn label(&self) -> String {
        format!("{SLOT_LABEL_PREFIX} {} - {}", self.start_time, self.end_time)
    }

    /// Absolute `[start, end)` bounds relative to the broadcast day's base date.
    ///
    /// A slot whose start is later than its end crosses midnight: it starts on the
    /// base date and ends the next day. A non-crossing `next_day` slot lies entirely
    /// on the next day.
    pub fn bounds(&self, base: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = parse_clock(&self.start_time)?;
        let end = parse_clock(&self.end_time)?;
        let next = base + Duration::days(1);

        let bounds = match (self.next_day, start > end) {
            (false, false) => (base.and_time(start), base.and_time(end)),
            (true, false) => (next.and_time(start), next.and_time(end)),
            (_, true) => (base.and_time(start), next.and_time(end)),
        };
        Some(bounds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotTable {
    monday_to_thursday: Vec<SlotDefinition>,
    friday: Vec<SlotDefinition>,
    saturday_sunday: Vec<SlotDefinition>,
}

impl SlotTable {
    pub fn new(
        monday_to_thursday: Vec<SlotDefinition>,
        friday: Vec<SlotDefinition>,
        saturday_sunday: Vec<SlotDefinition>,
    ) -> Self {
        Self {
            monday_to_thursday,
            friday,
            saturday_sunday,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::SlotTable(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        // Slot tables are often saved from Windows editors with a BOM
        let json = json.trim_start_matches('\u{feff}');
        let table: Self =
            serde_json::from_str(json).map_err(|e| ReportError::SlotTable(e.to_string()))?;

        for slot in [
            &table.monday_to_thursday,
            &table.friday,
            &table.saturday_sunday,
        ]
        .into_iter()
        .flatten()
        {
            if parse_clock(&slot.start_time).is_none() || parse_clock(&slot.end_time).is_none() {
                return Err(ReportError::SlotTable(format!(
                    "Invalid slot times '{}' - '{}'",
                    slot.start_time, slot.end_time
                )));
            }
        }
        Ok(table)
    }

    pub fn slots(&self, pattern: WeekdayPattern) -> &[SlotDefinition] {
        match pattern {
            WeekdayPattern::MondayToThursday => &self.monday_to_thursday,
            WeekdayPattern::Friday => &self.friday,
            WeekdayPattern::SaturdaySunday => &self.saturday_sunday,
        }
    }

    pub fn slots_for(&self, date: ReportDate) -> &[SlotDefinition] {
        self.slots(WeekdayPattern::for_weekday(date.weekday()))
    }
}

/// Rounded channel means over the unfiltered series within the slot bounds.
/// Returns `None` (with a warning) when the slot holds no data.
#[must_use]
pub fn slot_average(
    series: &MeasurementSeries,
    slot: &SlotDefinition,
    base: NaiveDate,
    precision: u32,
) -> Option<Vec<Option<f64>>> {
    let (start, end) = slot.bounds(base)?;
    let records = series.between(start, end);
    if records.is_empty() {
        warn!("No data found for slot {} - {}", slot.start_time, slot.end_time);
        return None;
    }
    Some(rounded_means(records, series.channels().len(), precision))
}

/// Interleave slot averages into the interval rows. Each slot row goes right after
/// the interval whose absolute end equals the slot's absolute end; slots with no
/// such interval are skipped with a warning.
#[must_use]
pub fn insert_slot_rows(
    intervals: &[IntervalRow],
    series: &MeasurementSeries,
    slots: &[SlotDefinition],
    base: NaiveDate,
    precision: u32,
) -> Vec<ReportRow> {
    let mut placed: Vec<(usize, ReportRow)> = Vec::new();

    for slot in slots {
        let Some((_, slot_end)) = slot.bounds(base) else {
            warn!("Skipping slot with invalid times {} - {}", slot.start_time, slot.end_time);
            continue;
        };

        let Some(position) = intervals.iter().position(|row| row.end() == slot_end) else {
            warn!(
                "Slot {} ends at {} which matches no interval boundary; skipped",
                slot.label(),
                slot_end.format("%Y-%m-%d %H:%M")
            );
            continue;
        };

        if let Some(values) = slot_average(series, slot, base, precision) {
            let label = slot.label();
            info!("Inserted slot average: {label}");
            placed.push((
                position,
                ReportRow {
                    label,
                    kind: RowKind::Slot,
                    values,
                },
            ));
        }
    }

    let mut rows = Vec::with_capacity(intervals.len() + placed.len());
    for (i, interval) in intervals.iter().enumerate() {
        rows.push(interval.to_report_row());
        rows.extend(
            placed
                .iter()
                .filter(|(position, _)| *position == i)
                .map(|(_, row)| row.clone()),
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::aggregate_intervals;
    use crate::types::Measurement;
    use log::{Level, LevelFilter, Metadata, Record};
    use std::sync::Mutex;

    /// Keeps warnings around so tests can assert on them.
    struct WarningCapture;

    static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static CAPTURE: WarningCapture = WarningCapture;

    impl log::Log for WarningCapture {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    fn capture_warnings() {
        // Only the first call installs the logger
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Warn);
    }

    fn warnings_mentioning(needle: &str) -> Vec<String> {
        WARNINGS
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.contains(needle))
            .cloned()
            .collect()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()
    }

    /// Full day from 02:00 to 01:59, value from `f` per minute.
    fn day_series(f: impl Fn(NaiveDateTime) -> f64) -> MeasurementSeries {
        let start = ts("2026-01-28 02:00");
        let records = (0..24 * 60)
            .map(|i| {
                let timestamp = start + Duration::minutes(i);
                Measurement {
                    timestamp,
                    values: vec![Some(f(timestamp))],
                }
            })
            .collect();
        MeasurementSeries::new(vec!["Digi 24".to_string()], records)
    }

    fn window_intervals(series: &MeasurementSeries) -> Vec<IntervalRow> {
        let window = series.between_inclusive(ts("2026-01-28 06:00"), ts("2026-01-29 00:59"));
        aggregate_intervals(window, 1, 2)
    }

    #[test]
    fn test_pattern_lookup() {
        assert_eq!(WeekdayPattern::for_weekday(Weekday::Thu), WeekdayPattern::MondayToThursday);
        assert_eq!(WeekdayPattern::for_weekday(Weekday::Fri), WeekdayPattern::Friday);
        assert_eq!(WeekdayPattern::for_weekday(Weekday::Sun), WeekdayPattern::SaturdaySunday);
    }

    #[test]
    fn test_bounds_resolution() {
        let same_day = SlotDefinition::new("20:00", "23:00", false);
        assert_eq!(
            same_day.bounds(base()),
            Some((ts("2026-01-28 20:00"), ts("2026-01-28 23:00")))
        );

        let crossing = SlotDefinition::new("23:00", "01:00", true);
        assert_eq!(
            crossing.bounds(base()),
            Some((ts("2026-01-28 23:00"), ts("2026-01-29 01:00")))
        );

        let after_midnight = SlotDefinition::new("00:00", "01:00", true);
        assert_eq!(
            after_midnight.bounds(base()),
            Some((ts("2026-01-29 00:00"), ts("2026-01-29 01:00")))
        );
    }

    #[test]
    fn test_prime_time_slot_inserted_after_matching_interval() {
        let series = day_series(|t| {
            if t >= ts("2026-01-28 20:00") && t < ts("2026-01-28 23:00") {
                2.0
            } else {
                0.0
            }
        });
        let intervals = window_intervals(&series);
        let slots = vec![SlotDefinition::new("20:00", "23:00", false)];

        let rows = insert_slot_rows(&intervals, &series, &slots, base(), 2);
        assert_eq!(rows.len(), intervals.len() + 1);

        let idx = rows.iter().position(|r| r.kind == RowKind::Slot).unwrap();
        assert_eq!(rows[idx - 1].label, "22:45 - 23:00");
        assert_eq!(rows[idx].label, "MEDIE 20:00 - 23:00");
        assert_eq!(rows[idx].values, vec![Some(2.0)]);
    }

    #[test]
    fn test_midnight_slot_matches_absolute_end() {
        let series = day_series(|_| 1.0);
        let intervals = window_intervals(&series);
        let slots = vec![SlotDefinition::new("23:00", "00:00", true)];

        let rows = insert_slot_rows(&intervals, &series, &slots, base(), 2);
        let idx = rows.iter().position(|r| r.kind == RowKind::Slot).unwrap();
        assert_eq!(rows[idx - 1].label, "23:45 - 00:00");
        assert_eq!(idx, rows.len() - 5);
    }

    #[test]
    fn test_next_day_slot_after_midnight() {
        let series = day_series(|t| if t >= ts("2026-01-29 00:00") { 4.0 } else { 1.0 });
        let intervals = window_intervals(&series);
        let slots = vec![SlotDefinition::new("00:00", "01:00", true)];

        let rows = insert_slot_rows(&intervals, &series, &slots, base(), 2);
        assert_eq!(rows.len(), intervals.len() + 1);

        let idx = rows.iter().position(|r| r.kind == RowKind::Slot).unwrap();
        assert_eq!(rows[idx - 1].label, "00:45 - 01:00");
        assert_eq!(rows[idx].label, "MEDIE 00:00 - 01:00");
        assert_eq!(rows[idx].values, vec![Some(4.0)]);
        assert_eq!(idx, rows.len() - 1);
    }

    #[test]
    fn test_misaligned_slot_is_skipped() {
        capture_warnings();
        let series = day_series(|_| 1.0);
        let intervals = window_intervals(&series);
        let slots = vec![
            SlotDefinition::new("20:00", "22:50", false),
            SlotDefinition::new("06:00", "09:00", false),
        ];

        let rows = insert_slot_rows(&intervals, &series, &slots, base(), 2);
        let slot_rows: Vec<&ReportRow> = rows.iter().filter(|r| r.kind == RowKind::Slot).collect();
        assert_eq!(slot_rows.len(), 1);
        assert_eq!(slot_rows[0].label, "MEDIE 06:00 - 09:00");

        let warnings = warnings_mentioning("MEDIE 20:00 - 22:50");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("matches no interval boundary"));
    }

    #[test]
    fn test_slot_uses_unfiltered_series() {
        // 01:00 - 02:00 next day lies outside a Mon-Thu interval window
        let series = day_series(|t| if t < ts("2026-01-28 06:00") { 0.0 } else { 3.0 });
        let slot = SlotDefinition::new("01:00", "02:00", true);
        assert_eq!(slot_average(&series, &slot, base(), 2), Some(vec![Some(3.0)]));

        let empty = SlotDefinition::new("03:00", "04:00", true);
        assert_eq!(slot_average(&series, &empty, base(), 2), None);
    }

    #[test]
    fn test_slot_table_parsing() {
        let json = "\u{feff}{
            \"monday_to_thursday\": [{\"start_time\": \"20:00\", \"end_time\": \"23:00\"}],
            \"friday\": [{\"start_time\": \"23:00\", \"end_time\": \"01:00\", \"next_day\": true}],
            \"saturday_sunday\": []
        }";
        let table = SlotTable::from_json_str(json).unwrap();
        assert_eq!(table.slots(WeekdayPattern::MondayToThursday)[0], SlotDefinition::new("20:00", "23:00", false));
        assert!(table.slots(WeekdayPattern::Friday)[0].next_day);
        assert!(table.slots(WeekdayPattern::SaturdaySunday).is_empty());

        let friday: ReportDate = "2026-01-30".parse().unwrap();
        assert_eq!(table.slots_for(friday).len(), 1);
    }

    #[test]
    fn test_slot_table_rejects_bad_input() {
        assert!(SlotTable::from_json_str(r#"{"friday": []}"#).is_err());
        let bad_time = r#"{"monday_to_thursday": [{"start_time": "25:00", "end_time": "23:00"}],
                           "friday": [], "saturday_sunday": []}"#;
        assert!(matches!(
            SlotTable::from_json_str(bad_time),
            Err(ReportError::SlotTable(_))
        ));
    }

    #[test]
    fn test_bundled_slot_table() {
        let table = SlotTable::from_json_str(include_str!("../config/time_slots.json")).unwrap();
        for pattern in [
            WeekdayPattern::MondayToThursday,
            WeekdayPattern::Friday,
            WeekdayPattern::SaturdaySunday,
        ] {
            assert!(!table.slots(pattern).is_empty());
        }
    }

    #[test]
    fn test_slot_table_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("time_slots.json");
        fs::write(
            &path,
            r#"{"monday_to_thursday": [], "friday": [], "saturday_sunday": [{"start_time": "06:00", "end_time": "09:00"}]}"#,
        )
        .unwrap();

        let table = SlotTable::load(&path).unwrap();
        assert_eq!(table.slots(WeekdayPattern::SaturdaySunday).len(), 1);
        assert!(SlotTable::load(dir.path().join("missing.json")).is_err());
    }
}
