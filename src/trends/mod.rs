//! Trend series
//!
//! Per-day energy/stress averages in chronological order, plus the
//! combined trends report returned to the application.

pub mod aggregator;

pub use aggregator::{build_trend_data, metric_mean, round_tenth, TrendSummary};

use crate::entry::{DailyEntry, DayAggregate};
use crate::insights::{generate_insights, InsightMap};
use crate::sources::{extract_sources, DataSources};
use serde::Serialize;

/// Everything the trends screen renders for a period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsReport {
    pub trend_data: Vec<DayAggregate>,
    pub insights: InsightMap,
    pub data_sources: DataSources,
    pub summary: TrendSummary,
}

/// Compute trend data, insights and source rankings for a set of entries
///
/// `period` is the requested day count; it shapes confidence and wording
/// but never truncates the entries.
pub fn trends_and_insights(entries: &[DailyEntry], period: u32) -> TrendsReport {
    let trend_data = build_trend_data(entries);
    let insights = generate_insights(&trend_data, period);
    let data_sources = extract_sources(entries);
    let summary = TrendSummary::from_days(&trend_data);

    tracing::debug!(
        entries = entries.len(),
        days = trend_data.len(),
        insights = insights.len(),
        period,
        "Computed trends and insights"
    );

    TrendsReport {
        trend_data,
        insights,
        data_sources,
        summary,
    }
}
