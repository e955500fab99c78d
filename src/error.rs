use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Input table does not have the expected shape.
    #[error("Malformed ratings table: {0}")]
    Parse(String),

    /// The broadcast window selected no rows.
    #[error("Broadcast window {start} .. {end} contains no data")]
    Window { start: String, end: String },

    #[error("Channel '{0}' not present in ratings table")]
    MissingChannel(String),

    #[error("Invalid slot table: {0}")]
    SlotTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Email delivery failed: {0}")]
    Email(String),
}
