use crate::slots::SlotTable;
use crate::whole_day::WHOLE_DAY_LABEL;

pub const DEFAULT_CHANNELS: [&str; 2] = ["Digi 24", "Antena 3 CNN"];

/// Everything one engine invocation needs beyond the input table and report date.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub window_start_hour: u32,
    pub precision: u32,
    pub channels: Vec<String>,
    /// `None` disables slot rows.
    pub slot_table: Option<SlotTable>,
    pub summary_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_start_hour: 6,
            precision: 2,
            channels: DEFAULT_CHANNELS.iter().map(ToString::to_string).collect(),
            slot_table: None,
            summary_label: WHOLE_DAY_LABEL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_slot_table(mut self, slot_table: SlotTable) -> Self {
        self.slot_table = Some(slot_table);
        self
    }
}

/// Split a comma-separated channel list such as "Digi 24,Antena 3 CNN".
pub fn parse_channel_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.window_start_hour, 6);
        assert_eq!(cfg.precision, 2);
        assert_eq!(cfg.channels, vec!["Digi 24", "Antena 3 CNN"]);
        assert!(cfg.slot_table.is_none());
        assert_eq!(cfg.summary_label, "Whole day");
    }

    #[test]
    fn test_parse_channel_list() {
        assert_eq!(
            parse_channel_list(" Digi 24, Antena 3 CNN ,,"),
            vec!["Digi 24", "Antena 3 CNN"]
        );
        assert!(parse_channel_list("").is_empty());
    }
}
