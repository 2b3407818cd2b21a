//! Journal entry types
//!
//! This module defines the input records handed to the engine by the
//! surrounding application, and the per-day aggregate derived from them:
//! - `DailyEntry`: one day's journal record
//! - `SlotLevels`: levels recorded per time slot
//! - `DayAggregate`: per-day energy/stress averages
//! - `Metric`: which of the two tracked series is meant

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used for entry keys
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time of day a level was recorded for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// All slots in chronological order
    pub fn all() -> &'static [TimeSlot] {
        &[TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening]
    }
}

/// Levels recorded for each time slot of a day (1-10, or absent)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotLevels {
    #[serde(default)]
    pub morning: Option<u8>,
    #[serde(default)]
    pub afternoon: Option<u8>,
    #[serde(default)]
    pub evening: Option<u8>,
}

impl SlotLevels {
    /// Create levels from explicit per-slot values
    pub fn new(morning: Option<u8>, afternoon: Option<u8>, evening: Option<u8>) -> Self {
        Self {
            morning,
            afternoon,
            evening,
        }
    }

    /// Same level recorded in every slot
    pub fn uniform(level: u8) -> Self {
        Self::new(Some(level), Some(level), Some(level))
    }

    /// Level recorded for a slot
    pub fn get(&self, slot: TimeSlot) -> Option<u8> {
        match slot {
            TimeSlot::Morning => self.morning,
            TimeSlot::Afternoon => self.afternoon,
            TimeSlot::Evening => self.evening,
        }
    }

    /// Iterate over the recorded (non-null) levels
    pub fn recorded(&self) -> impl Iterator<Item = u8> + '_ {
        TimeSlot::all().iter().filter_map(|slot| self.get(*slot))
    }

    /// Arithmetic mean of the recorded levels, `None` if nothing was recorded
    pub fn average(&self) -> Option<f64> {
        let (sum, count) = self
            .recorded()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

/// One day's journal record, as produced by the storage collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    /// Calendar date (`YYYY-MM-DD`), unique per entry
    pub date: String,
    #[serde(default)]
    pub energy_levels: SlotLevels,
    #[serde(default)]
    pub stress_levels: SlotLevels,
    /// Free text: what gave energy today
    #[serde(default)]
    pub energy_sources: String,
    /// Free text: what caused stress today
    #[serde(default)]
    pub stress_sources: String,
}

impl DailyEntry {
    /// Create an empty entry for a date
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    /// Builder method: set energy levels
    pub fn energy(mut self, levels: SlotLevels) -> Self {
        self.energy_levels = levels;
        self
    }

    /// Builder method: set stress levels
    pub fn stress(mut self, levels: SlotLevels) -> Self {
        self.stress_levels = levels;
        self
    }

    /// Builder method: set the energy sources text
    pub fn energy_sources(mut self, text: impl Into<String>) -> Self {
        self.energy_sources = text.into();
        self
    }

    /// Builder method: set the stress sources text
    pub fn stress_sources(mut self, text: impl Into<String>) -> Self {
        self.stress_sources = text.into();
        self
    }

    /// Free text for a metric
    pub fn sources(&self, metric: Metric) -> &str {
        match metric {
            Metric::Energy => &self.energy_sources,
            Metric::Stress => &self.stress_sources,
        }
    }

    /// Levels for a metric
    pub fn levels(&self, metric: Metric) -> &SlotLevels {
        match metric {
            Metric::Energy => &self.energy_levels,
            Metric::Stress => &self.stress_levels,
        }
    }

    /// Parsed calendar date, `None` if the key is not `YYYY-MM-DD`
    pub fn day(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// The two tracked series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Energy,
    Stress,
}

impl Metric {
    /// Both metrics in analysis order
    pub fn all() -> &'static [Metric] {
        &[Metric::Energy, Metric::Stress]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Energy => write!(f, "energy"),
            Metric::Stress => write!(f, "stress"),
        }
    }
}

/// Per-day energy/stress averages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayAggregate {
    pub date: String,
    pub energy_avg: Option<f64>,
    pub stress_avg: Option<f64>,
}

impl DayAggregate {
    /// Whether at least one metric has a value for this day
    pub fn has_data(&self) -> bool {
        self.energy_avg.is_some() || self.stress_avg.is_some()
    }

    /// Average for a metric
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Energy => self.energy_avg,
            Metric::Stress => self.stress_avg,
        }
    }

    /// Parsed calendar date
    pub fn day(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Day of week, 0 = Sunday .. 6 = Saturday
    pub fn weekday(&self) -> Option<u32> {
        self.day().map(|d| d.weekday().num_days_from_sunday())
    }
}

/// Parse an entry date key
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Total ordering key for date keys
///
/// Valid dates sort chronologically; keys that do not parse sort after
/// them, by their text.
pub fn chronological_key(date: &str) -> (bool, Option<NaiveDate>, &str) {
    let day = parse_date(date);
    (day.is_none(), day, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronological_key_is_total_with_invalid_dates() {
        let mut keys = vec!["2024-3-4", "2024-2x2", "2024-10-2", "garbage", "2024-3-1", "2024-02-28"];
        keys.sort_by(|a, b| chronological_key(a).cmp(&chronological_key(b)));
        assert_eq!(
            keys,
            vec!["2024-02-28", "2024-3-1", "2024-3-4", "2024-10-2", "2024-2x2", "garbage"]
        );
    }

    #[test]
    fn test_slot_average_ignores_missing() {
        let levels = SlotLevels::new(Some(6), None, Some(8));
        assert_eq!(levels.average(), Some(7.0));
        assert_eq!(SlotLevels::default().average(), None);
    }

    #[test]
    fn test_entry_deserializes_camel_case() {
        let json = r#"{
            "date": "2024-03-04",
            "energyLevels": {"morning": 7, "afternoon": null, "evening": 5},
            "stressLevels": {"morning": 3},
            "energySources": "Morning walk, coffee",
            "stressSources": ""
        }"#;
        let entry: DailyEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.energy_levels.morning, Some(7));
        assert_eq!(entry.energy_levels.afternoon, None);
        assert_eq!(entry.stress_levels.evening, None);
        assert_eq!(entry.sources(Metric::Energy), "Morning walk, coffee");
    }

    #[test]
    fn test_entry_missing_fields_default() {
        let entry: DailyEntry = serde_json::from_str(r#"{"date": "2024-03-04"}"#).unwrap();
        assert_eq!(entry.energy_levels, SlotLevels::default());
        assert!(entry.stress_sources.is_empty());
    }

    #[test]
    fn test_weekday_sunday_is_zero() {
        // 2024-03-03 was a Sunday
        let day = DayAggregate {
            date: "2024-03-03".to_string(),
            energy_avg: Some(5.0),
            stress_avg: None,
        };
        assert_eq!(day.weekday(), Some(0));

        let bad = DayAggregate {
            date: "not-a-date".to_string(),
            energy_avg: None,
            stress_avg: None,
        };
        assert_eq!(bad.weekday(), None);
        assert!(!bad.has_data());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Energy.to_string(), "energy");
        assert_eq!(
            serde_json::to_string(&Metric::Stress).unwrap(),
            "\"stress\""
        );
    }
}
