//! Clustering strategy seam
//!
//! A [`Clusterer`] groups distinct phrases into themed clusters. The engine
//! turns clusters into the two-level `MainPattern` / `SubPattern` output.
//! Clusterers run cooperatively: they call [`ClusterContext::checkpoint`]
//! between chunks so cancellation is observed and progress stays current.

use super::text::PhraseGroup;
use super::types::DiscoveryMethod;
use crate::analysis::AbortSignal;
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

/// Progress callback: `(current, total)` work units
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// A themed group of phrases produced by a clusterer
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub label: String,
    /// Indices into the phrase slice given to the clusterer
    pub members: Vec<usize>,
}

/// Errors raised while clustering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Cancellation observed at a checkpoint
    #[error("Clustering aborted")]
    Aborted,

    #[error("Cluster references phrase {index} but only {len} phrases exist")]
    InvalidMember { index: usize, len: usize },

    #[error("Phrase {0} assigned to more than one cluster")]
    DuplicateMember(usize),

    #[error("Clustering failed: {0}")]
    Failed(String),
}

/// Cooperative execution context handed to clusterers
pub struct ClusterContext<'a> {
    abort: &'a AbortSignal,
    on_progress: Option<&'a ProgressFn>,
    chunk_size: usize,
}

impl<'a> ClusterContext<'a> {
    pub fn new(abort: &'a AbortSignal, on_progress: Option<&'a ProgressFn>, chunk_size: usize) -> Self {
        Self {
            abort,
            on_progress,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Phrases to process between checkpoints
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fail fast if cancellation was requested
    pub fn check(&self) -> Result<(), ClusterError> {
        if self.abort.is_aborted() {
            Err(ClusterError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Report progress, poll the abort flag and yield to the scheduler
    pub async fn checkpoint(&self, current: usize, total: usize) -> Result<(), ClusterError> {
        self.check()?;
        if let Some(report) = self.on_progress {
            report(current, total);
        }
        tokio::task::yield_now().await;
        self.check()
    }
}

/// A phrase clustering technique
#[async_trait]
pub trait Clusterer: Send + Sync {
    /// Tag recorded in `PatternResult::discovery_method`
    fn method(&self) -> DiscoveryMethod;

    /// Group the phrases into clusters
    ///
    /// `phrases` is sorted by mention count, most mentioned first. Phrases
    /// may be left out of every cluster but must not appear in two.
    async fn cluster(
        &self,
        phrases: &[PhraseGroup],
        cx: &ClusterContext<'_>,
    ) -> Result<Vec<Cluster>, ClusterError>;
}

/// Check cluster membership against the phrase list
pub fn validate_clusters(clusters: &[Cluster], len: usize) -> Result<(), ClusterError> {
    let mut seen = HashSet::new();
    for cluster in clusters {
        for &index in &cluster.members {
            if index >= len {
                return Err(ClusterError::InvalidMember { index, len });
            }
            if !seen.insert(index) {
                return Err(ClusterError::DuplicateMember(index));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_validate_rejects_out_of_range() {
        let clusters = vec![Cluster {
            label: "a".into(),
            members: vec![0, 3],
        }];
        assert_eq!(
            validate_clusters(&clusters, 2),
            Err(ClusterError::InvalidMember { index: 3, len: 2 })
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let clusters = vec![
            Cluster {
                label: "a".into(),
                members: vec![0],
            },
            Cluster {
                label: "b".into(),
                members: vec![1, 0],
            },
        ];
        assert_eq!(
            validate_clusters(&clusters, 2),
            Err(ClusterError::DuplicateMember(0))
        );
    }

    #[tokio::test]
    async fn test_checkpoint_reports_and_observes_abort() {
        let abort = AbortSignal::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let report = move |current: usize, _total: usize| {
            seen.store(current, Ordering::SeqCst);
        };
        let cx = ClusterContext::new(&abort, Some(&report as &ProgressFn), 0);
        assert_eq!(cx.chunk_size(), 1);

        cx.checkpoint(4, 10).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        abort.abort();
        assert_eq!(cx.checkpoint(5, 10).await, Err(ClusterError::Aborted));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
