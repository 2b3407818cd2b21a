//! Run duration history for time estimates

use crate::config::AnalysisConfig;
use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of completed run durations, oldest first
#[derive(Debug, Clone)]
pub struct DurationHistory {
    durations: VecDeque<Duration>,
    capacity: usize,
}

impl DurationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            durations: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a completed run, evicting the oldest when full
    pub fn push(&mut self, duration: Duration) {
        if self.durations.len() == self.capacity {
            self.durations.pop_front();
        }
        self.durations.push_back(duration);
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn durations(&self) -> impl Iterator<Item = &Duration> {
        self.durations.iter()
    }

    pub fn average(&self) -> Option<Duration> {
        if self.durations.is_empty() {
            return None;
        }
        let total: Duration = self.durations.iter().sum();
        Some(total / self.durations.len() as u32)
    }

    /// Expected duration of the next run
    ///
    /// Uses the rolling average once a run has completed, otherwise a
    /// per-entry guess with a floor.
    pub fn estimate(&self, entry_count: usize, config: &AnalysisConfig) -> Duration {
        self.average()
            .unwrap_or_else(|| config.fallback_estimate(entry_count))
    }
}

impl Default for DurationHistory {
    fn default() -> Self {
        Self::new(5)
    }
}
