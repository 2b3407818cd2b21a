//! Trend Aggregator
//!
//! Turns journal entries into the chronological per-day series used by
//! charts and by the insight generator.

use crate::entry::{chronological_key, normalize, DailyEntry, DayAggregate, Metric};
use serde::Serialize;

/// Build the per-day trend series
///
/// Days without any recorded level are dropped. The result is sorted by
/// date ascending; entries with equal dates keep their input order and
/// keys that are not valid dates come last.
pub fn build_trend_data(entries: &[DailyEntry]) -> Vec<DayAggregate> {
    let mut days: Vec<DayAggregate> = normalize(entries)
        .into_iter()
        .filter(DayAggregate::has_data)
        .collect();

    days.sort_by(|a, b| chronological_key(&a.date).cmp(&chronological_key(&b.date)));

    days
}

/// Mean of the non-null values of a metric across the series
pub fn metric_mean(days: &[DayAggregate], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = days.iter().filter_map(|d| d.value(metric)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Headline numbers for a trend series
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    /// Days with at least one recorded level
    pub days_tracked: usize,
    pub average_energy: Option<f64>,
    pub average_stress: Option<f64>,
    /// Date with the highest energy average
    pub peak_energy_day: Option<String>,
    /// Date with the highest stress average
    pub peak_stress_day: Option<String>,
}

impl TrendSummary {
    /// Summarize a trend series
    pub fn from_days(days: &[DayAggregate]) -> Self {
        Self {
            days_tracked: days.len(),
            average_energy: metric_mean(days, Metric::Energy).map(round_tenth),
            average_stress: metric_mean(days, Metric::Stress).map(round_tenth),
            peak_energy_day: peak_day(days, Metric::Energy),
            peak_stress_day: peak_day(days, Metric::Stress),
        }
    }
}

/// Date of the first day holding the maximum value of a metric
fn peak_day(days: &[DayAggregate], metric: Metric) -> Option<String> {
    let mut best: Option<(&DayAggregate, f64)> = None;
    for day in days {
        if let Some(value) = day.value(metric) {
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((day, value)),
            }
        }
    }
    best.map(|(day, _)| day.date.clone())
}

/// Round to one decimal place
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
