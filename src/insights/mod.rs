//! Statistical insights
//!
//! - **stats**: Pearson correlation and confidence helpers
//! - **types**: `Insight`, `InsightKind`, `InsightMap`
//! - **generator**: correlation, weekly pattern, trend and recommendation analyses
//!
//! Insufficient data is never an error here: it either omits an insight or
//! produces a zero-confidence variant.

pub mod generator;
pub mod stats;
pub mod types;

pub use generator::{generate_insights, InsightGenerator};
pub use stats::{correlation_confidence, correlation_strength, pearson, PearsonOutcome};
pub use types::{Insight, InsightDatum, InsightKind, InsightMap};
