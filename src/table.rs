use crate::error::{ReportError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const INDEX_FIELD: &str = "Timebands";

#[derive(Debug, Deserialize)]
struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

impl SchemaField {
    // pandas writes a DatetimeIndex as "datetime" and date columns as "date"
    fn is_index_candidate(&self) -> bool {
        matches!(self.field_type.as_str(), "string" | "datetime" | "date")
    }
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    schema: Schema,
    data: Vec<serde_json::Map<String, Value>>,
}

/// One source row: the untouched index string plus one cell per table channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub index: String,
    pub values: Vec<Option<f64>>,
}

/// Canonical per-minute table handed over by the spreadsheet ingestion step.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingsTable {
    index_field: String,
    channels: Vec<String>,
    rows: Vec<RawRow>,
}

impl RatingsTable {
    pub fn new(index_field: &str, channels: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            index_field: index_field.to_string(),
            channels,
            rows,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses `{"schema": {"fields": [...]}, "data": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawTable =
            serde_json::from_str(json).map_err(|e| ReportError::Parse(e.to_string()))?;

        let candidates: Vec<&SchemaField> = raw
            .schema
            .fields
            .iter()
            .filter(|f| f.is_index_candidate())
            .collect();

        let index_field = match candidates.as_slice() {
            [single] => single.name.clone(),
            [] => return Err(ReportError::Parse("No string or datetime index field in schema".to_string())),
            _ => candidates
                .iter()
                .find(|f| f.name == INDEX_FIELD)
                .map(|f| f.name.clone())
                .ok_or_else(|| {
                    ReportError::Parse("Ambiguous index field: several string fields".to_string())
                })?,
        };

        let channels: Vec<String> = raw
            .schema
            .fields
            .iter()
            .filter(|f| f.name != index_field && !f.is_index_candidate())
            .map(|f| f.name.clone())
            .collect();

        let mut rows = Vec::with_capacity(raw.data.len());
        for (line, record) in raw.data.iter().enumerate() {
            let index = record
                .get(&index_field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let mut values = Vec::with_capacity(channels.len());
            for channel in &channels {
                let cell = match record.get(channel) {
                    None | Some(Value::Null) => None,
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(other) => {
                        return Err(ReportError::Parse(format!(
                            "Row {line}: non-numeric value {other} for channel '{channel}'"
                        )));
                    }
                };
                values.push(cell);
            }
            rows.push(RawRow { index, values });
        }

        Ok(Self {
            index_field,
            channels,
            rows,
        })
    }

    pub fn index_field(&self) -> &str {
        &self.index_field
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Projects the table onto `requested`, in that order.
    pub fn select(&self, requested: &[String]) -> Result<Vec<RawRow>> {
        let positions = requested
            .iter()
            .map(|name| {
                self.channels
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| ReportError::MissingChannel(name.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| RawRow {
                index: row.index.clone(),
                values: positions
                    .iter()
                    .map(|&p| row.values.get(p).copied().flatten())
                    .collect(),
            })
            .collect())
    }
}
