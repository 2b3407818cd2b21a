//! Hierarchical pattern engine
//!
//! Turns the free-text sources of one metric into main patterns (themes)
//! and sub-patterns (distinct wordings) with the clusterer of the chosen
//! mode.

use super::cluster::{validate_clusters, Cluster, ClusterContext, ClusterError, Clusterer, ProgressFn};
use super::deep::TfidfClusterer;
use super::fast::KeywordClusterer;
use super::text::{capitalize, phrase_groups, PhraseGroup};
use super::types::{MainPattern, PatternMode, PatternResult, SubPattern};
use crate::analysis::error::panic_message;
use crate::analysis::{AbortSignal, AnalysisError, AnalysisResult};
use crate::config::PatternConfig;
use crate::entry::{DailyEntry, Metric};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Pattern discovery with one clusterer per mode
#[derive(Clone)]
pub struct PatternEngine {
    config: PatternConfig,
    fast: Arc<dyn Clusterer>,
    deep: Arc<dyn Clusterer>,
}

impl PatternEngine {
    /// Engine with the built-in keyword and TF-IDF clusterers
    pub fn new(config: PatternConfig) -> Self {
        let deep = Arc::new(TfidfClusterer::new(config.similarity_threshold));
        Self::with_clusterers(config, Arc::new(KeywordClusterer::new()), deep)
    }

    /// Engine with custom clustering strategies
    pub fn with_clusterers(
        config: PatternConfig,
        fast: Arc<dyn Clusterer>,
        deep: Arc<dyn Clusterer>,
    ) -> Self {
        Self { config, fast, deep }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    fn clusterer(&self, mode: PatternMode) -> &Arc<dyn Clusterer> {
        match mode {
            PatternMode::Fast => &self.fast,
            PatternMode::Deep => &self.deep,
        }
    }

    /// Discover patterns in the sources of one metric
    ///
    /// Clustering failures, panics included, produce an empty result
    /// carrying the failure message. Cancellation is the only error returned.
    pub async fn analyze(
        &self,
        entries: &[DailyEntry],
        metric: Metric,
        mode: PatternMode,
        abort: &AbortSignal,
        on_progress: Option<&ProgressFn>,
    ) -> AnalysisResult<PatternResult> {
        if abort.is_aborted() {
            return Err(AnalysisError::Aborted);
        }
        let groups = phrase_groups(entries, metric);
        self.analyze_groups(groups, metric, mode, abort, on_progress)
            .await
    }

    /// Cluster prepared phrase groups, most mentioned first
    pub async fn analyze_groups(
        &self,
        groups: Vec<PhraseGroup>,
        metric: Metric,
        mode: PatternMode,
        abort: &AbortSignal,
        on_progress: Option<&ProgressFn>,
    ) -> AnalysisResult<PatternResult> {
        if groups.is_empty() {
            tracing::debug!(%metric, %mode, "No sources to cluster");
            return Ok(PatternResult::empty(metric, mode));
        }

        let clusterer = self.clusterer(mode);
        let cx = ClusterContext::new(abort, on_progress, self.config.chunk_size);
        let total_mentions: usize = groups.iter().map(|g| g.count).sum();

        let clustered = AssertUnwindSafe(clusterer.cluster(&groups, &cx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ClusterError::Failed(panic_message(payload.as_ref()))))
            .and_then(|clusters| {
                validate_clusters(&clusters, groups.len())?;
                Ok(clusters)
            });

        match clustered {
            Ok(clusters) => {
                let main_patterns = self.assemble(&groups, clusters);
                tracing::debug!(
                    %metric,
                    %mode,
                    phrases = groups.len(),
                    patterns = main_patterns.len(),
                    "Patterns discovered"
                );
                Ok(PatternResult::discovered(
                    metric,
                    mode,
                    clusterer.method(),
                    total_mentions,
                    main_patterns,
                ))
            }
            Err(ClusterError::Aborted) => Err(AnalysisError::Aborted),
            Err(e) => {
                let reason = AnalysisError::Clustering {
                    metric,
                    reason: e.to_string(),
                };
                tracing::warn!(%metric, %mode, error = %e, "Pattern clustering failed");
                Ok(PatternResult::failed(metric, mode, reason.to_string()))
            }
        }
    }

    /// Build the two-level pattern list from clusters
    fn assemble(&self, groups: &[PhraseGroup], clusters: Vec<Cluster>) -> Vec<MainPattern> {
        let mut main_patterns: Vec<MainPattern> = clusters
            .into_iter()
            .filter(|c| !c.members.is_empty())
            .map(|cluster| {
                let mut sub_patterns: Vec<SubPattern> = cluster
                    .members
                    .iter()
                    .map(|&index| self.sub_pattern(&groups[index]))
                    .collect();
                let total_count = sub_patterns.iter().map(|s| s.count).sum();

                sub_patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
                sub_patterns.truncate(self.config.max_sub_patterns);

                MainPattern {
                    label: cluster.label,
                    total_count,
                    sub_patterns,
                }
            })
            .collect();

        main_patterns.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.label.cmp(&b.label))
        });
        main_patterns.truncate(self.config.max_main_patterns);
        main_patterns
    }

    fn sub_pattern(&self, group: &PhraseGroup) -> SubPattern {
        SubPattern {
            label: capitalize(&group.key),
            count: group.count,
            examples: group
                .examples
                .iter()
                .take(self.config.max_examples)
                .cloned()
                .collect(),
        }
    }
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(PatternConfig::default())
    }
}

impl std::fmt::Debug for PatternEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternEngine")
            .field("config", &self.config)
            .field("fast", &self.fast.method())
            .field("deep", &self.deep.method())
            .finish()
    }
}
