//! Analysis run controller
//!
//! Drives one pattern-analysis run at a time through its stages, publishes
//! progress events on a broadcast channel and honors cooperative abort.
//!
//! ```text
//! Idle ──start──▶ Running ──▶ Completed ─┐
//!   ▲                 ├──────▶ Aborted ──┤
//!   │                 └──────▶ Failed ───┤
//!   └────────────────────────────────────┘
//! ```

use super::abort::AbortSignal;
use super::error::{AnalysisError, AnalysisResult};
use super::progress::{ProgressEvent, ProgressTracker, Stage};
use super::timing::DurationHistory;
use crate::config::AnalysisConfig;
use crate::entry::{normalize, DailyEntry, Metric};
use crate::patterns::{phrase_groups, PatternEngine, PatternMode, PatternResult, ProgressFn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Lifecycle phase of the controller
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
    Failed,
}

/// What a run request ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted,
    Failed(String),
    /// Another run was already in progress
    Rejected,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Latest pattern results per metric
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PatternSet {
    pub energy: Option<PatternResult>,
    pub stress: Option<PatternResult>,
}

impl PatternSet {
    pub fn get(&self, metric: Metric) -> Option<&PatternResult> {
        match metric {
            Metric::Energy => self.energy.as_ref(),
            Metric::Stress => self.stress.as_ref(),
        }
    }

    fn set(&mut self, result: PatternResult) {
        match result.metric {
            Metric::Energy => self.energy = Some(result),
            Metric::Stress => self.stress = Some(result),
        }
    }
}

/// Observable controller state
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisState {
    pub phase: RunState,
    /// How the most recent finished run ended
    pub last_outcome: Option<RunState>,
    /// Mode of the current or most recent run
    pub mode: Option<PatternMode>,
    pub patterns: PatternSet,
    /// 0-100
    pub progress: f64,
    pub error: Option<String>,
    pub has_run_analysis: bool,
    pub last_run_id: Option<String>,
}

/// Output of a run that got through every stage
#[derive(Debug)]
struct StageOutput {
    patterns: PatternSet,
    failures: Vec<String>,
}

struct ActiveRun {
    run_id: String,
    abort: AbortSignal,
    tracker: Arc<Mutex<ProgressTracker>>,
    tasks: Vec<AbortHandle>,
}

/// Everything a run needs, created while the run slot is claimed
struct RunContext {
    run_id: String,
    started: Instant,
    estimate: Duration,
    abort: AbortSignal,
    tracker: Arc<Mutex<ProgressTracker>>,
}

/// Releases the run slot when `run` returns or its future is dropped
///
/// A run that never reached its end is cancelled: the abort flag is set,
/// its tasks are stopped and the phase goes back to Idle.
struct RunGuard<'a> {
    controller: &'a AnalysisController,
    run_id: String,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let controller = self.controller;
        let active = lock(&controller.active).take();

        if !self.finished {
            if let Some(run) = active {
                run.abort.abort();
                lock(&run.tracker).close();
                for task in &run.tasks {
                    task.abort();
                }
            }
            tracing::warn!(run_id = %self.run_id, "Analysis dropped before completion");
            reset_interrupted(&controller.state, &self.run_id);
        }

        controller.running.store(false, Ordering::SeqCst);
    }
}

fn mark_interrupted(state: &mut AnalysisState, run_id: &str) {
    if state.phase == RunState::Running && state.last_run_id.as_deref() == Some(run_id) {
        state.phase = RunState::Idle;
        state.progress = 0.0;
        state.last_outcome = Some(RunState::Aborted);
    }
}

/// Put an interrupted run's state back to Idle
fn reset_interrupted(state: &Arc<RwLock<AnalysisState>>, run_id: &str) {
    match state.try_write() {
        Ok(mut guard) => mark_interrupted(&mut guard, run_id),
        Err(_) => {
            // Lock is busy; finish on the runtime if there is one
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let state = state.clone();
                let run_id = run_id.to_string();
                handle.spawn(async move {
                    mark_interrupted(&mut *state.write().await, &run_id);
                });
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs pattern analyses one at a time
pub struct AnalysisController {
    config: AnalysisConfig,
    engine: PatternEngine,
    state: Arc<RwLock<AnalysisState>>,
    history: Mutex<DurationHistory>,
    events: broadcast::Sender<ProgressEvent>,
    running: AtomicBool,
    active: Mutex<Option<ActiveRun>>,
}

impl AnalysisController {
    pub fn new(config: AnalysisConfig, engine: PatternEngine) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let history = DurationHistory::new(config.history_size);

        Self {
            config,
            engine,
            state: Arc::new(RwLock::new(AnalysisState::default())),
            history: Mutex::new(history),
            events,
            running: AtomicBool::new(false),
            active: Mutex::new(None),
        }
    }

    /// Receive progress events of subsequent runs
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the observable state
    pub async fn state(&self) -> AnalysisState {
        self.state.read().await.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Completed run durations, oldest first
    pub fn run_durations(&self) -> Vec<Duration> {
        lock(&self.history).durations().copied().collect()
    }

    /// Request cancellation of the active run
    ///
    /// Progress events stop before this returns. Returns `false` when no
    /// run is active.
    pub fn abort_analysis(&self) -> bool {
        let active = lock(&self.active);
        match active.as_ref() {
            Some(run) => {
                run.abort.abort();
                lock(&run.tracker).close();
                tracing::info!(run_id = %run.run_id, "Analysis abort requested");
                true
            }
            None => false,
        }
    }

    /// Analyze the sources of both metrics in the given mode
    ///
    /// Returns `RunOutcome::Rejected` without side effects when a run is
    /// already in progress. Dropping the returned future cancels the run.
    pub async fn run(&self, entries: Vec<DailyEntry>, mode: PatternMode) -> RunOutcome {
        let Some(run) = self.claim(entries.len()) else {
            tracing::debug!(%mode, "Analysis already running, request ignored");
            return RunOutcome::Rejected;
        };
        self.drive(run, entries, mode).await
    }

    /// Take the run slot and register the run so it can be aborted at once
    fn claim(&self, entry_count: usize) -> Option<RunContext> {
        let mut active = lock(&self.active);
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let estimate = lock(&self.history).estimate(entry_count, &self.config);
        let abort = AbortSignal::new();
        let tracker = Arc::new(Mutex::new(ProgressTracker::new(
            run_id.clone(),
            estimate,
            &self.config,
            started,
        )));

        *active = Some(ActiveRun {
            run_id: run_id.clone(),
            abort: abort.clone(),
            tracker: tracker.clone(),
            tasks: Vec::new(),
        });

        Some(RunContext {
            run_id,
            started,
            estimate,
            abort,
            tracker,
        })
    }

    async fn drive(&self, run: RunContext, entries: Vec<DailyEntry>, mode: PatternMode) -> RunOutcome {
        let mut guard = RunGuard {
            controller: self,
            run_id: run.run_id.clone(),
            finished: false,
        };
        let outcome = self.execute(run, entries, mode).await;
        guard.finished = true;
        outcome
    }

    async fn execute(&self, run: RunContext, entries: Vec<DailyEntry>, mode: PatternMode) -> RunOutcome {
        let RunContext {
            run_id,
            started,
            estimate,
            abort,
            tracker,
        } = run;

        {
            let mut state = self.state.write().await;
            state.phase = RunState::Running;
            state.mode = Some(mode);
            state.progress = 0.0;
            state.last_run_id = Some(run_id.clone());
        }

        tracing::info!(
            run_id = %run_id,
            %mode,
            entries = entries.len(),
            estimate_ms = estimate.as_millis() as u64,
            "Analysis started"
        );

        let ticker = tokio::spawn(run_ticker(
            tracker.clone(),
            abort.clone(),
            self.events.clone(),
            self.state.clone(),
            self.config.tick_interval(),
        ));

        let mut worker = tokio::spawn(run_stages(
            self.engine.clone(),
            entries,
            mode,
            abort.clone(),
            tracker.clone(),
        ));
        let worker_abort = worker.abort_handle();
        if let Some(active) = lock(&self.active).as_mut() {
            active.tasks = vec![ticker.abort_handle(), worker_abort.clone()];
        }

        let result: AnalysisResult<StageOutput> = tokio::select! {
            biased;
            _ = abort.aborted() => {
                worker_abort.abort();
                Err(AnalysisError::Aborted)
            }
            joined = &mut worker => joined.map_err(AnalysisError::from).and_then(|r| r),
        };

        ticker.abort();
        let _ = ticker.await;

        let elapsed = started.elapsed();
        let mut state = self.state.write().await;
        state.phase = RunState::Idle;

        match result {
            Ok(output) => {
                lock(&self.history).push(elapsed);
                let done = lock(&tracker).complete();
                let _ = self.events.send(done);

                state.patterns = output.patterns;
                state.progress = 100.0;
                state.has_run_analysis = true;
                state.error = if output.failures.is_empty() {
                    None
                } else {
                    Some(output.failures.join("; "))
                };
                state.last_outcome = Some(RunState::Completed);

                tracing::info!(
                    run_id = %run_id,
                    duration_ms = elapsed.as_millis() as u64,
                    failures = output.failures.len(),
                    "Analysis completed"
                );
                RunOutcome::Completed
            }
            Err(AnalysisError::Aborted) => {
                lock(&tracker).close();
                state.progress = 0.0;
                state.last_outcome = Some(RunState::Aborted);

                tracing::info!(run_id = %run_id, "Analysis aborted");
                RunOutcome::Aborted
            }
            Err(e) => {
                lock(&tracker).close();
                let message = e.to_string();
                state.progress = 0.0;
                state.error = Some(message.clone());
                state.last_outcome = Some(RunState::Failed);

                tracing::error!(run_id = %run_id, error = %e, "Analysis failed");
                RunOutcome::Failed(message)
            }
        }
    }
}

impl std::fmt::Debug for AnalysisController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisController")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Publish a progress event every tick until the run is closed or aborted
async fn run_ticker(
    tracker: Arc<Mutex<ProgressTracker>>,
    abort: AbortSignal,
    events: broadcast::Sender<ProgressEvent>,
    state: Arc<RwLock<AnalysisState>>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let percentage = {
            let mut tracker = lock(&tracker);
            if abort.is_aborted() {
                break;
            }
            match tracker.tick(Instant::now()) {
                Some(event) => {
                    let percentage = event.percentage;
                    // No receivers is fine
                    let _ = events.send(event);
                    percentage
                }
                None => break,
            }
        };

        state.write().await.progress = percentage;
    }
}

/// The analysis pipeline; runs on its own task
async fn run_stages(
    engine: PatternEngine,
    entries: Vec<DailyEntry>,
    mode: PatternMode,
    abort: AbortSignal,
    tracker: Arc<Mutex<ProgressTracker>>,
) -> AnalysisResult<StageOutput> {
    let checkpoint = || -> AnalysisResult<()> {
        if abort.is_aborted() {
            Err(AnalysisError::Aborted)
        } else {
            Ok(())
        }
    };

    lock(&tracker).enter(Stage::Prepare);
    let days = normalize(&entries);
    tracing::debug!(entries = entries.len(), days = days.len(), "Prepared entries");
    lock(&tracker).advance(1, 1);
    tokio::task::yield_now().await;
    checkpoint()?;

    lock(&tracker).enter(Stage::ExtractSources);
    let mut groups = Vec::with_capacity(2);
    for (i, &metric) in Metric::all().iter().enumerate() {
        groups.push((metric, phrase_groups(&entries, metric)));
        lock(&tracker).advance(i + 1, 2);
        tokio::task::yield_now().await;
        checkpoint()?;
    }

    let mut patterns = PatternSet::default();
    let mut failures = Vec::new();
    for (metric, phrases) in groups {
        lock(&tracker).enter(Stage::for_metric(metric));

        let stage_tracker = tracker.clone();
        let report = move |current: usize, total: usize| {
            lock(&stage_tracker).advance(current, total);
        };

        let result = engine
            .analyze_groups(phrases, metric, mode, &abort, Some(&report as &ProgressFn))
            .await?;
        if let Some(reason) = &result.failure {
            failures.push(reason.clone());
        }
        patterns.set(result);
        checkpoint()?;
    }

    lock(&tracker).enter(Stage::Finalize);
    lock(&tracker).advance(1, 1);

    Ok(StageOutput { patterns, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternConfig;
    use crate::entry::SlotLevels;
    use crate::patterns::{
        Cluster, ClusterContext, ClusterError, Clusterer, DiscoveryMethod, KeywordClusterer,
        PhraseGroup, TfidfClusterer,
    };
    use async_trait::async_trait;
    use tokio::sync::broadcast::error::TryRecvError;

    fn sample_entries(days: usize) -> Vec<DailyEntry> {
        (0..days)
            .map(|i| {
                DailyEntry::new(format!("2024-03-{:02}", i % 28 + 1))
                    .energy(SlotLevels::uniform(6))
                    .stress(SlotLevels::uniform(4))
                    .energy_sources(format!("morning walk, coffee, topic {}", i))
                    .stress_sources(format!("work deadline, traffic, errand {}", i))
            })
            .collect()
    }

    fn fast_config() -> AnalysisConfig {
        AnalysisConfig {
            tick_interval_ms: 10,
            ..AnalysisConfig::default()
        }
    }

    /// Sleeps at every chunk so runs last long enough to interrupt
    struct SlowClusterer {
        delay: Duration,
    }

    #[async_trait]
    impl Clusterer for SlowClusterer {
        fn method(&self) -> DiscoveryMethod {
            DiscoveryMethod::custom("slow")
        }

        async fn cluster(
            &self,
            phrases: &[PhraseGroup],
            cx: &ClusterContext<'_>,
        ) -> Result<Vec<Cluster>, ClusterError> {
            for done in 1..=phrases.len() {
                tokio::time::sleep(self.delay).await;
                cx.checkpoint(done, phrases.len()).await?;
            }
            Ok(Vec::new())
        }
    }

    /// Fails on stress-style phrases only
    struct PickyClusterer;

    #[async_trait]
    impl Clusterer for PickyClusterer {
        fn method(&self) -> DiscoveryMethod {
            DiscoveryMethod::custom("picky")
        }

        async fn cluster(
            &self,
            phrases: &[PhraseGroup],
            cx: &ClusterContext<'_>,
        ) -> Result<Vec<Cluster>, ClusterError> {
            if phrases.iter().any(|p| p.key.contains("deadline")) {
                return Err(ClusterError::Failed("cannot vectorize deadlines".into()));
            }
            KeywordClusterer::new().cluster(phrases, cx).await
        }
    }

    /// Panics on stress-style phrases only
    struct PanickingClusterer;

    #[async_trait]
    impl Clusterer for PanickingClusterer {
        fn method(&self) -> DiscoveryMethod {
            DiscoveryMethod::custom("panicking")
        }

        async fn cluster(
            &self,
            phrases: &[PhraseGroup],
            cx: &ClusterContext<'_>,
        ) -> Result<Vec<Cluster>, ClusterError> {
            if phrases.iter().any(|p| p.key.contains("deadline")) {
                panic!("bad stress input");
            }
            KeywordClusterer::new().cluster(phrases, cx).await
        }
    }

    fn controller_with(fast: Arc<dyn Clusterer>) -> Arc<AnalysisController> {
        let engine = PatternEngine::with_clusterers(
            PatternConfig {
                chunk_size: 1,
                ..PatternConfig::default()
            },
            fast,
            Arc::new(TfidfClusterer::default()),
        );
        Arc::new(AnalysisController::new(fast_config(), engine))
    }

    fn slow_controller() -> Arc<AnalysisController> {
        controller_with(Arc::new(SlowClusterer {
            delay: Duration::from_millis(20),
        }))
    }

    #[tokio::test]
    async fn test_completed_run_publishes_patterns() {
        let controller = Arc::new(AnalysisController::new(
            fast_config(),
            PatternEngine::default(),
        ));
        let mut events = controller.subscribe();

        let outcome = controller.run(sample_entries(10), PatternMode::Fast).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let state = controller.state().await;
        assert_eq!(state.phase, RunState::Idle);
        assert_eq!(state.last_outcome, Some(RunState::Completed));
        assert!(state.has_run_analysis);
        assert_eq!(state.progress, 100.0);
        assert!(state.error.is_none());

        let energy = state.patterns.get(Metric::Energy).unwrap();
        assert_eq!(energy.mode, PatternMode::Fast);
        assert!(!energy.main_patterns.is_empty());
        assert!(state.patterns.get(Metric::Stress).is_some());

        let mut last = None;
        let mut previous = 0.0;
        while let Ok(event) = events.try_recv() {
            assert!(event.percentage >= previous);
            previous = event.percentage;
            last = Some(event);
        }
        let last = last.unwrap();
        assert_eq!(last.percentage, 100.0);
        assert_eq!(Some(last.run_id), state.last_run_id);
    }

    #[tokio::test]
    async fn test_abort_stops_events_and_returns_to_idle() {
        let controller = slow_controller();
        let mut events = controller.subscribe();

        let run = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run(sample_entries(30), PatternMode::Fast).await })
        };

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(controller.is_running());
        assert!(controller.abort_analysis());

        // everything published so far was sent before the abort returned
        while events.try_recv().is_ok() {}

        let outcome = tokio::time::timeout(Duration::from_millis(100), run)
            .await
            .expect("run should stop within a tick")
            .unwrap();
        assert_eq!(outcome, RunOutcome::Aborted);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

        let state = controller.state().await;
        assert_eq!(state.phase, RunState::Idle);
        assert_eq!(state.last_outcome, Some(RunState::Aborted));
        assert_eq!(state.progress, 0.0);
        assert!(!state.has_run_analysis);
        assert!(state.patterns.energy.is_none());
        assert!(state.error.is_none());
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_abort_keeps_previous_results() {
        let controller = slow_controller();

        // deep mode uses the real TF-IDF clusterer and finishes quickly
        let outcome = controller.run(sample_entries(5), PatternMode::Deep).await;
        assert_eq!(outcome, RunOutcome::Completed);
        let before = controller.state().await.patterns;

        let run = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run(sample_entries(20), PatternMode::Fast).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.abort_analysis();
        assert_eq!(run.await.unwrap(), RunOutcome::Aborted);

        let state = controller.state().await;
        assert_eq!(state.patterns, before);
        assert_eq!(state.mode, Some(PatternMode::Fast));
        assert!(state.has_run_analysis);
        assert_eq!(state.phase, RunState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let controller = slow_controller();

        let run = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run(sample_entries(20), PatternMode::Fast).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = controller.run(sample_entries(3), PatternMode::Fast).await;
        assert_eq!(second, RunOutcome::Rejected);

        controller.abort_analysis();
        assert_eq!(run.await.unwrap(), RunOutcome::Aborted);
    }

    #[tokio::test]
    async fn test_abort_without_run_is_noop() {
        let controller = slow_controller();
        assert!(!controller.abort_analysis());
        assert_eq!(controller.state().await.phase, RunState::Idle);
    }

    #[tokio::test]
    async fn test_history_keeps_last_five_runs() {
        let controller = controller_with(Arc::new(KeywordClusterer::new()));
        for _ in 0..7 {
            let outcome = controller.run(sample_entries(3), PatternMode::Fast).await;
            assert_eq!(outcome, RunOutcome::Completed);
        }
        assert_eq!(controller.run_durations().len(), 5);
    }

    #[tokio::test]
    async fn test_metric_failure_surfaces_error_but_completes() {
        let controller = controller_with(Arc::new(PickyClusterer));

        let outcome = controller.run(sample_entries(6), PatternMode::Fast).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let state = controller.state().await;
        let energy = state.patterns.get(Metric::Energy).unwrap();
        assert!(!energy.is_failed());
        assert!(!energy.main_patterns.is_empty());

        let stress = state.patterns.get(Metric::Stress).unwrap();
        assert!(stress.is_failed());
        assert!(stress.main_patterns.is_empty());
        assert_eq!(stress.discovery_method, DiscoveryMethod::NONE);

        assert!(state.error.unwrap().contains("cannot vectorize deadlines"));
    }

    #[tokio::test]
    async fn test_clusterer_panic_is_contained_to_its_metric() {
        let controller = controller_with(Arc::new(PanickingClusterer));

        let outcome = controller.run(sample_entries(4), PatternMode::Fast).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let state = controller.state().await;
        assert_eq!(state.phase, RunState::Idle);
        assert_eq!(state.last_outcome, Some(RunState::Completed));

        let energy = state.patterns.get(Metric::Energy).unwrap();
        assert!(!energy.is_failed());
        assert!(!energy.main_patterns.is_empty());

        let stress = state.patterns.get(Metric::Stress).unwrap();
        assert!(stress.is_failed());
        assert!(stress.main_patterns.is_empty());

        assert!(state.error.unwrap().contains("bad stress input"));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_dropped_run_releases_controller() {
        let controller = slow_controller();
        let mut events = controller.subscribe();

        let dropped = tokio::time::timeout(
            Duration::from_millis(60),
            controller.run(sample_entries(30), PatternMode::Fast),
        )
        .await;
        assert!(dropped.is_err());
        assert!(!controller.is_running());
        assert!(!controller.abort_analysis());

        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = controller.state().await;
        assert_eq!(state.phase, RunState::Idle);
        assert_eq!(state.last_outcome, Some(RunState::Aborted));
        assert_eq!(state.progress, 0.0);

        // the cancelled run's ticker is gone
        while events.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

        let outcome = controller.run(sample_entries(2), PatternMode::Fast).await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert!(controller.state().await.has_run_analysis);
    }

    #[tokio::test]
    async fn test_abort_right_after_claim_is_honored() {
        let controller = slow_controller();

        let run = controller.claim(5).unwrap();
        assert!(controller.is_running());
        assert!(controller.abort_analysis());

        let outcome = controller.drive(run, sample_entries(5), PatternMode::Fast).await;
        assert_eq!(outcome, RunOutcome::Aborted);
        assert!(!controller.is_running());

        let state = controller.state().await;
        assert_eq!(state.phase, RunState::Idle);
        assert!(state.patterns.energy.is_none());
    }

    #[tokio::test]
    async fn test_empty_entries_complete_with_empty_patterns() {
        let controller = controller_with(Arc::new(KeywordClusterer::new()));
        let outcome = controller.run(Vec::new(), PatternMode::Deep).await;
        assert_eq!(outcome, RunOutcome::Completed);

        let state = controller.state().await;
        for &metric in Metric::all() {
            let result = state.patterns.get(metric).unwrap();
            assert_eq!(result.total_mentions, 0);
            assert!(result.main_patterns.is_empty());
        }
    }
}
