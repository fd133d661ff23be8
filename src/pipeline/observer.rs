//! Observer hooks for long sampling runs.
//!
//! The runner reports every snapshot to a [`SamplingObserver`] and asks it
//! whether to keep going. Stopping is honored between samples only: the
//! snapshot in flight is always accumulated first.
//!
//! Provided observers:
//!
//! - [`NoopObserver`]: zero overhead, never stops
//! - [`ProgressLogger`]: `tracing::info!` every N samples
//! - [`StopFlag`]: cooperative cancellation from another thread

use crate::nullmodel::SwapOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Stage names used in tracing spans.
pub const STAGE_VALIDATE: &str = "validate";
pub const STAGE_PROJECT: &str = "project";
pub const STAGE_SAMPLE: &str = "sample";
pub const STAGE_SCORE: &str = "score";

/// Progress of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleReport {
    /// 1-based snapshot index
    pub index: usize,
    pub total: usize,
    pub outcome: SwapOutcome,
}

/// Summary handed to [`SamplingObserver::on_run_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub samples_drawn: usize,
    pub samples_requested: usize,
    pub tracked_pairs: usize,
    pub elapsed: Duration,
    pub stopped_early: bool,
}

/// Callbacks around the sampling loop. All methods have empty defaults.
pub trait SamplingObserver {
    fn on_run_start(&mut self, _total: usize, _tracked_pairs: usize) {}

    fn on_sample(&mut self, _report: &SampleReport) {}

    fn on_run_end(&mut self, _report: &RunReport) {}

    /// Checked after each sample; `true` ends the run early.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SamplingObserver for NoopObserver {}

/// Logs progress through `tracing` every `every` samples.
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    every: usize,
    started: Option<Instant>,
}

impl ProgressLogger {
    /// `every == 0` disables per-sample lines; start and end are still logged.
    pub fn new(every: usize) -> Self {
        Self {
            every,
            started: None,
        }
    }
}

impl SamplingObserver for ProgressLogger {
    fn on_run_start(&mut self, total: usize, tracked_pairs: usize) {
        self.started = Some(Instant::now());
        info!(total, tracked_pairs, "generating random graphs");
    }

    fn on_sample(&mut self, report: &SampleReport) {
        if self.every == 0 || (report.index % self.every != 0 && report.index != report.total) {
            return;
        }
        let elapsed_ms = self.started.map_or(0, |t| t.elapsed().as_millis() as u64);
        info!(
            sample = report.index,
            total = report.total,
            elapsed_ms,
            "sampling progress"
        );
    }

    fn on_run_end(&mut self, report: &RunReport) {
        info!(
            samples = report.samples_drawn,
            requested = report.samples_requested,
            elapsed_ms = report.elapsed.as_millis() as u64,
            stopped_early = report.stopped_early,
            "sampling finished"
        );
    }
}

/// Cooperative cancellation flag.
///
/// Clone it, hand the clone to another thread, and call
/// [`request_stop`](Self::request_stop); the run ends after the current
/// sample.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stop: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

impl SamplingObserver for StopFlag {
    fn should_stop(&self) -> bool {
        self.is_stopped()
    }
}

/// Wall-clock timer for a run.
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}
