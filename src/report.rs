use crate::config::EngineConfig;
use crate::error::Result;
use crate::html_renderer;
use crate::intervals::{IntervalRow, aggregate_intervals};
use crate::slots::insert_slot_rows;
use crate::table::RatingsTable;
use crate::timestamps::normalize_rows;
use crate::types::{ReportDate, ReportRow, RowKind};
use crate::whole_day::whole_day_row;
use crate::window::select_window;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, Table};
use log::info;
use serde_json::{Map, Number, Value};

/// Assembled daily report: intervals with interleaved slot rows, whole-day row last.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    date: ReportDate,
    channels: Vec<String>,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(date: ReportDate, channels: Vec<String>, rows: Vec<ReportRow>) -> Self {
        Self {
            date,
            channels,
            rows,
        }
    }

    pub fn date(&self) -> ReportDate {
        self.date
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn whole_day(&self) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.kind == RowKind::WholeDay)
    }

    /// `{channel: {label: value, ...}}`, keys in report order, missing values as null.
    pub fn to_json(&self) -> Value {
        let mut by_channel = Map::new();
        for (i, channel) in self.channels.iter().enumerate() {
            let mut entries = Map::new();
            for row in &self.rows {
                let value = row
                    .values
                    .get(i)
                    .copied()
                    .flatten()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number);
                entries.insert(row.label.clone(), value);
            }
            by_channel.insert(channel.clone(), Value::Object(entries));
        }
        Value::Object(by_channel)
    }

    pub fn to_html(&self) -> String {
        html_renderer::render_table(self)
    }

    pub fn subject(&self) -> String {
        format!("Audiente {}", self.date.date().format("%d.%m.%Y"))
    }
}

/// Run the whole pipeline for one broadcast day.
pub fn generate_report(
    table: &RatingsTable,
    date: ReportDate,
    config: &EngineConfig,
) -> Result<Report> {
    let channels = if config.channels.is_empty() {
        table.channels().to_vec()
    } else {
        config.channels.clone()
    };
    let precision = config.precision;

    let selected = table.select(&channels)?;
    let series = normalize_rows(selected, channels.clone(), date);

    let (window, slice) = select_window(&series, date, config.window_start_hour)?;
    let intervals = aggregate_intervals(slice, channels.len(), precision);
    let base = window.start.date();

    let mut rows = match &config.slot_table {
        Some(slot_table) => {
            info!("Inserting slot averages...");
            insert_slot_rows(
                &intervals,
                &series,
                slot_table.slots_for(date),
                base,
                precision,
            )
        }
        None => intervals.iter().map(IntervalRow::to_report_row).collect(),
    };
    let body_rows = rows.len();
    rows.push(whole_day_row(
        &series,
        base,
        precision,
        &config.summary_label,
    ));

    info!("Generated report with {body_rows} rows + overall average");
    Ok(Report::new(date, channels, rows))
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn print_report(report: &Report) {
    println!(
        "{}",
        format!("=== Daily Ratings for {} ===", report.date()).cyan()
    );

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    let mut header = vec!["Time".to_string()];
    header.extend(report.channels().iter().cloned());
    table.set_header(header);

    for row in report.rows() {
        let max = row.max_value();
        let mut cells = Vec::with_capacity(row.values.len() + 1);

        match row.kind {
            RowKind::Interval => {
                cells.push(Cell::new(&row.label));
                for value in &row.values {
                    let cell = Cell::new(format_value(*value));
                    cells.push(if value.is_some() && *value == max {
                        cell.fg(Color::Green).add_attribute(Attribute::Bold)
                    } else {
                        cell
                    });
                }
            }
            RowKind::Slot => {
                cells.push(Cell::new(&row.label).fg(Color::Cyan));
                for value in &row.values {
                    cells.push(
                        Cell::new(format_value(*value))
                            .fg(Color::Cyan)
                            .add_attribute(Attribute::Italic),
                    );
                }
            }
            RowKind::WholeDay => {
                cells.push(Cell::new(&row.label).add_attribute(Attribute::Bold));
                for value in &row.values {
                    cells.push(Cell::new(format_value(*value)).add_attribute(Attribute::Bold));
                }
            }
        }
        table.add_row(cells);
    }

    println!("{table}");
}
