//! Progress tracking
//!
//! Real progress is stage-weighted: each stage owns a fixed slice of the
//! 0-100 range and work inside a stage fills its slice. On top of that an
//! optimistic counter creeps forward on its own so the bar keeps moving
//! during long stages, bounded so it never runs too far ahead of real
//! progress or reaches 100 before the run is done.

use crate::config::AnalysisConfig;
use crate::entry::Metric;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Pipeline stage of an analysis run
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Prepare,
    ExtractSources,
    AnalyzeEnergy,
    AnalyzeStress,
    Finalize,
}

impl Stage {
    pub fn all() -> [Stage; 5] {
        [
            Stage::Prepare,
            Stage::ExtractSources,
            Stage::AnalyzeEnergy,
            Stage::AnalyzeStress,
            Stage::Finalize,
        ]
    }

    /// Share of the whole run, in percentage points
    pub fn weight(&self) -> f64 {
        match self {
            Stage::Prepare => 5.0,
            Stage::ExtractSources => 15.0,
            Stage::AnalyzeEnergy => 35.0,
            Stage::AnalyzeStress => 35.0,
            Stage::Finalize => 10.0,
        }
    }

    /// Percentage at which the stage begins
    pub fn start(&self) -> f64 {
        match self {
            Stage::Prepare => 0.0,
            Stage::ExtractSources => 5.0,
            Stage::AnalyzeEnergy => 20.0,
            Stage::AnalyzeStress => 55.0,
            Stage::Finalize => 90.0,
        }
    }

    pub fn for_metric(metric: Metric) -> Stage {
        match metric {
            Metric::Energy => Stage::AnalyzeEnergy,
            Metric::Stress => Stage::AnalyzeStress,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Prepare => "prepare",
            Stage::ExtractSources => "extract-sources",
            Stage::AnalyzeEnergy => "analyze-energy",
            Stage::AnalyzeStress => "analyze-stress",
            Stage::Finalize => "finalize",
        };
        f.pad(name)
    }
}

/// Progress notification published on every tick
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub run_id: String,
    pub stage: Stage,
    /// 0-100, never decreasing within a run
    pub percentage: f64,
    /// Work units done in the current stage
    pub current: usize,
    pub total: usize,
    pub estimated_time_remaining_ms: u64,
}

/// Progress state of one run
#[derive(Debug)]
pub struct ProgressTracker {
    run_id: String,
    started: Instant,
    estimate: Duration,
    stage: Stage,
    current: usize,
    total: usize,
    optimistic: f64,
    last_step: Instant,
    reported: f64,
    closed: bool,
    step: f64,
    step_interval: Duration,
    max_lead: f64,
    ceiling: f64,
    overrun_buffer: Duration,
}

impl ProgressTracker {
    pub fn new(
        run_id: impl Into<String>,
        estimate: Duration,
        config: &AnalysisConfig,
        now: Instant,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            started: now,
            estimate,
            stage: Stage::Prepare,
            current: 0,
            total: 0,
            optimistic: 0.0,
            last_step: now,
            reported: 0.0,
            closed: false,
            step: config.optimistic_step.max(1.0),
            step_interval: config.optimistic_interval(),
            max_lead: config.max_optimistic_lead.max(0.0),
            ceiling: config.optimistic_ceiling.clamp(0.0, 100.0),
            overrun_buffer: config.overrun_buffer(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stop emitting events for this run
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Move to the start of a stage
    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.current = 0;
        self.total = 0;
    }

    /// Record work done inside the current stage
    pub fn advance(&mut self, current: usize, total: usize) {
        self.current = current.min(total);
        self.total = total;
    }

    /// Real stage-weighted progress
    pub fn actual(&self) -> f64 {
        let fraction = if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        };
        self.stage.start() + self.stage.weight() * fraction
    }

    /// Last reported percentage
    pub fn percentage(&self) -> f64 {
        self.reported
    }

    /// Remaining time, never zero while the run is still going
    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.estimate {
            self.estimate - elapsed
        } else {
            self.overrun_buffer
        }
    }

    /// Advance the optimistic counter and build the event for this tick
    ///
    /// Returns `None` once the tracker is closed.
    pub fn tick(&mut self, now: Instant) -> Option<ProgressEvent> {
        if self.closed {
            return None;
        }

        let actual = self.actual();
        self.optimistic = self.optimistic.max(actual);

        let since = now.saturating_duration_since(self.last_step);
        let steps = (since.as_nanos() / self.step_interval.as_nanos().max(1)) as u32;
        if steps > 0 {
            self.optimistic += self.step * steps as f64;
            self.last_step += self.step_interval * steps;
        }

        let cap = (actual + self.max_lead).min(self.ceiling);
        self.optimistic = self.optimistic.min(cap);
        let value = self.optimistic.max(actual).min(self.ceiling);
        self.reported = self.reported.max(value);

        Some(self.event(self.remaining(now)))
    }

    /// Final 100% event; closes the tracker
    pub fn complete(&mut self) -> ProgressEvent {
        self.stage = Stage::Finalize;
        self.current = self.total;
        self.reported = 100.0;
        self.closed = true;
        self.event(Duration::ZERO)
    }

    fn event(&self, remaining: Duration) -> ProgressEvent {
        ProgressEvent {
            run_id: self.run_id.clone(),
            stage: self.stage,
            percentage: self.reported,
            current: self.current,
            total: self.total,
            estimated_time_remaining_ms: remaining.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(now: Instant) -> ProgressTracker {
        ProgressTracker::new(
            "run-1",
            Duration::from_secs(2),
            &AnalysisConfig::default(),
            now,
        )
    }

    #[test]
    fn test_stage_weights_cover_full_range() {
        let total: f64 = Stage::all().iter().map(|s| s.weight()).sum();
        assert_eq!(total, 100.0);
        for pair in Stage::all().windows(2) {
            assert_eq!(pair[0].start() + pair[0].weight(), pair[1].start());
        }
        assert_eq!(Stage::for_metric(Metric::Stress).start(), 55.0);
    }

    #[test]
    fn test_actual_progress_is_stage_weighted() {
        let now = Instant::now();
        let mut progress = tracker(now);
        progress.enter(Stage::AnalyzeEnergy);
        progress.advance(5, 10);
        assert_eq!(progress.actual(), 37.5);
    }

    #[test]
    fn test_optimistic_creeps_one_point_per_interval() {
        let now = Instant::now();
        let mut progress = tracker(now);

        let first = progress.tick(now).unwrap();
        assert_eq!(first.percentage, 0.0);

        let later = progress.tick(now + Duration::from_millis(1_500)).unwrap();
        assert_eq!(later.percentage, 3.0);
    }

    #[test]
    fn test_optimistic_capped_by_lead_and_ceiling() {
        let now = Instant::now();
        let mut progress = tracker(now);

        let event = progress.tick(now + Duration::from_secs(60)).unwrap();
        assert_eq!(event.percentage, 15.0);

        progress.enter(Stage::Finalize);
        progress.advance(9, 10);
        let event = progress.tick(now + Duration::from_secs(120)).unwrap();
        assert_eq!(event.percentage, 95.0);
    }

    #[test]
    fn test_reported_percentage_is_monotonic() {
        let now = Instant::now();
        let mut progress = tracker(now);
        progress.enter(Stage::AnalyzeStress);
        progress.advance(10, 10);
        let high = progress.tick(now).unwrap().percentage;
        assert_eq!(high, 90.0);

        // a restarted stage lowers real progress but not the reported value
        progress.enter(Stage::AnalyzeEnergy);
        let after = progress.tick(now + Duration::from_millis(50)).unwrap().percentage;
        assert!(after >= high);
    }

    #[test]
    fn test_remaining_uses_buffer_after_overrun() {
        let now = Instant::now();
        let progress = tracker(now);
        assert_eq!(
            progress.remaining(now + Duration::from_millis(500)),
            Duration::from_millis(1_500)
        );
        assert_eq!(
            progress.remaining(now + Duration::from_secs(10)),
            Duration::from_millis(1_000)
        );
    }

    #[test]
    fn test_closed_tracker_emits_nothing() {
        let now = Instant::now();
        let mut progress = tracker(now);
        let done = progress.complete();
        assert_eq!(done.percentage, 100.0);
        assert_eq!(done.estimated_time_remaining_ms, 0);
        assert!(progress.tick(now).is_none());
    }
}
