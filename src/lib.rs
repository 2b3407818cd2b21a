//! # Energylog
//!
//! Analytics and pattern discovery for an energy & stress journal. Turns a
//! list of daily entries into trend insights and hierarchical clusters of
//! the free-text "what gave me energy / what stressed me" notes.
//!
//! ## Features
//!
//! - **Trend insights**: energy/stress correlation, weekly rhythm, trend direction, recommendations
//! - **Source ranking**: most frequent energy and stress sources with recent examples
//! - **Pattern discovery**: fast keyword grouping or deep TF-IDF clustering
//! - **Live progress**: broadcast progress events with time estimates and cooperative abort
//!
//! ## Modules
//!
//! - [`entry`]: Journal entry types and per-day normalization
//! - [`trends`]: Chronological trend series and the trends report
//! - [`insights`]: Statistical insight generation
//! - [`sources`]: Source phrase frequency ranking
//! - [`patterns`]: Hierarchical pattern engine
//! - [`analysis`]: Run controller with progress and cancellation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use energylog::{AnalyticsEngine, Config, DailyEntry, SlotLevels};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = AnalyticsEngine::new(&Config::default());
//!
//!     let entries = vec![
//!         DailyEntry::new("2024-03-04")
//!             .energy(SlotLevels::new(Some(7), Some(5), None))
//!             .stress(SlotLevels::uniform(3))
//!             .energy_sources("Morning run, coffee")
//!             .stress_sources("Work deadline"),
//!     ];
//!
//!     // Watch progress while a run is going
//!     let mut progress = engine.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = progress.recv().await {
//!             println!("{:?} {:.0}%", event.stage, event.percentage);
//!         }
//!     });
//!
//!     engine.run_fast_analysis(&entries).await;
//!     let state = engine.state().await;
//!     println!("{:?}", state.patterns.energy);
//!
//!     let report = engine.get_trends_and_insights(&entries, 7);
//!     println!("{} days tracked", report.summary.days_tracked);
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod entry;
pub mod insights;
pub mod logging;
pub mod patterns;
pub mod sources;
pub mod trends;

// Re-export top-level types for convenience
pub use engine::AnalyticsEngine;

pub use entry::{normalize, DailyEntry, DayAggregate, Metric, SlotLevels, TimeSlot};

pub use trends::{trends_and_insights, TrendSummary, TrendsReport};

pub use insights::{generate_insights, Insight, InsightDatum, InsightKind, InsightMap};

pub use sources::{extract_sources, DataSources, SourceExample, SourcePhrase};

pub use patterns::{
    Cluster, ClusterContext, ClusterError, Clusterer, DiscoveryMethod, KeywordClusterer,
    MainPattern, PatternEngine, PatternMode, PatternResult, SubPattern, TfidfClusterer,
};

pub use analysis::{
    AbortSignal, AnalysisController, AnalysisError, AnalysisResult, AnalysisState,
    ProgressEvent, RunOutcome, RunState, Stage,
};

pub use config::{
    generate_default_config, AnalysisConfig, Config, ConfigError, LoggingConfig, PatternConfig,
};
