//! Analysis error types

use crate::entry::Metric;
use std::any::Any;
use thiserror::Error;

/// Errors that stop an analysis run
///
/// Insufficient data is not represented here: it surfaces as a
/// low-confidence insight or an empty pattern result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The caller requested cancellation
    #[error("Analysis aborted by user")]
    Aborted,

    /// Pattern clustering failed for one metric
    #[error("Pattern discovery failed for {metric}: {reason}")]
    Clustering { metric: Metric, reason: String },

    /// Anything else that went wrong during a run
    #[error("Analysis failed: {0}")]
    Unexpected(String),
}

impl AnalysisError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, AnalysisError::Aborted)
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            return AnalysisError::Aborted;
        }
        match err.try_into_panic() {
            Ok(payload) => AnalysisError::Unexpected(panic_message(payload.as_ref())),
            Err(err) => AnalysisError::Unexpected(err.to_string()),
        }
    }
}

/// Readable text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
