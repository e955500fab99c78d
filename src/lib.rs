//! Daily TV ratings report engine: turns one broadcast day of per-minute
//! audience measurements into quarter-hour, daypart and whole-day averages.

pub mod config;
pub mod email;
pub mod error;
pub mod html_renderer;
pub mod intervals;
pub mod report;
pub mod slots;
pub mod stats;
pub mod table;
pub mod timestamps;
pub mod types;
pub mod whole_day;
pub mod window;

pub use config::EngineConfig;
pub use error::{ReportError, Result};
pub use report::{Report, generate_report};
pub use slots::SlotTable;
pub use table::RatingsTable;
pub use types::ReportDate;
