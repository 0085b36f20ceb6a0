//! Update event emitted after a successful gather

use chrono::{DateTime, Local};

/// Owned snapshot of a source taken right after it gathered a new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUpdate {
    /// Name of the source that produced the value
    pub name: String,
    /// Newly gathered value
    pub value: String,
    /// Unit suffix, may be empty
    pub data_unit: String,
    /// Wall-clock time of the refresh
    pub refreshed_at: DateTime<Local>,
}

impl SourceUpdate {
    /// Value with its unit appended, e.g. `42 %`
    pub fn display_value(&self) -> String {
        if self.data_unit.is_empty() {
            self.value.clone()
        } else {
            format!("{} {}", self.value, self.data_unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_appends_unit() {
        let mut update = SourceUpdate {
            name: "ram-usage".to_string(),
            value: "42".to_string(),
            data_unit: "%".to_string(),
            refreshed_at: Local::now(),
        };
        assert_eq!(update.display_value(), "42 %");

        update.data_unit.clear();
        assert_eq!(update.display_value(), "42");
    }
}
