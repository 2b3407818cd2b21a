//! Entry normalization
//!
//! Reduces raw journal entries to the per-day numeric averages the
//! statistics work with. Order and multiplicity are preserved.

use super::types::{DailyEntry, DayAggregate};

/// Normalize a single entry into its per-day averages
pub fn normalize_entry(entry: &DailyEntry) -> DayAggregate {
    DayAggregate {
        date: entry.date.clone(),
        energy_avg: entry.energy_levels.average(),
        stress_avg: entry.stress_levels.average(),
    }
}

/// Normalize entries, one aggregate per entry, in input order
///
/// A metric with no recorded slot for a day is `None`, never 0.
pub fn normalize(entries: &[DailyEntry]) -> Vec<DayAggregate> {
    entries.iter().map(normalize_entry).collect()
}
