//! Analytics engine facade
//!
//! The single entry point the application talks to: pattern runs with
//! progress and abort, plus the synchronous trends/insights read.

use crate::analysis::{AnalysisController, AnalysisState, ProgressEvent, RunOutcome};
use crate::config::Config;
use crate::entry::DailyEntry;
use crate::patterns::{PatternEngine, PatternMode};
use crate::trends::{trends_and_insights, TrendsReport};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Energy/stress analytics over journal entries
///
/// Cheap to clone; clones share the run state and duration history.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    controller: Arc<AnalysisController>,
}

impl AnalyticsEngine {
    pub fn new(config: &Config) -> Self {
        let patterns = PatternEngine::new(config.patterns.clone());
        Self::with_pattern_engine(config, patterns)
    }

    /// Engine using a custom pattern engine (alternative clusterers)
    pub fn with_pattern_engine(config: &Config, patterns: PatternEngine) -> Self {
        Self {
            controller: Arc::new(AnalysisController::new(config.analysis.clone(), patterns)),
        }
    }

    /// Keyword-based pattern analysis, cheap enough to run on every refresh
    pub async fn run_fast_analysis(&self, entries: &[DailyEntry]) -> RunOutcome {
        self.controller
            .run(entries.to_vec(), PatternMode::Fast)
            .await
    }

    /// Thorough TF-IDF clustering; only run when the user asks for it
    pub async fn run_deep_analysis(&self, entries: &[DailyEntry]) -> RunOutcome {
        self.controller
            .run(entries.to_vec(), PatternMode::Deep)
            .await
    }

    /// Cancel the active run; `false` when nothing is running
    pub fn abort_analysis(&self) -> bool {
        self.controller.abort_analysis()
    }

    /// Trend series, insights, source rankings and summary for a period
    pub fn get_trends_and_insights(&self, entries: &[DailyEntry], period: u32) -> TrendsReport {
        trends_and_insights(entries, period)
    }

    /// Progress events of subsequent runs
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.controller.subscribe()
    }

    pub async fn state(&self) -> AnalysisState {
        self.controller.state().await
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
