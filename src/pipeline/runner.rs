//! Pipeline runner: projection, sampling, accumulation and scoring in one call.
//!
//! Stages run in order:
//! 1. Validate the config and the graph's preconditions
//! 2. Project the observed graph onto its bottom nodes
//! 3. Sample `nsample` snapshots, accumulating counts after each one
//! 4. Score every tracked pair and rank the significant ones
//!
//! The graph is borrowed mutably for the whole run and is left in its final
//! randomized state. Graph preconditions are checked once, by the sampler,
//! before anything is projected or reported to the observer.

use crate::errors::Result;
use crate::graph::{BipartiteGraph, WeightedProjection};
use crate::nullmodel::{rng_from_seed, EdgeSwapRandomizer, NullModelSampler};
use crate::pipeline::observer::{
    ProgressLogger, RunReport, SampleReport, SamplingObserver, StageClock, STAGE_PROJECT,
    STAGE_SAMPLE, STAGE_SCORE, STAGE_VALIDATE,
};
use crate::stats::{CooccurrenceAccumulator, PairSummary, RawSampleLog, ZScoreEngine};
use crate::types::{FdsmConfig, NodePair, ScoredPair};
use serde::Serialize;
use tracing::{debug, warn};

/// Enter a tracing span for a pipeline stage.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("fdsm_stage", stage = $name).entered();
    };
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct FdsmReport {
    /// Pairs with `z > min_z`, descending by z-score
    pub significant: Vec<ScoredPair>,
    /// Every tracked pair, in projection order
    pub summaries: Vec<PairSummary>,
    pub samples_requested: usize,
    pub samples_drawn: usize,
    pub swaps_requested: usize,
    pub swaps_performed: usize,
    /// Samples whose retry budget ran out before all swaps were done
    pub exhausted_samples: usize,
    pub stopped_early: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_counts: Option<RawSampleLog>,
}

impl FdsmReport {
    /// `(pair, z)` for every pair that has a z-score, unranked
    pub fn z_scores(&self) -> Vec<(NodePair, f64)> {
        self.summaries
            .iter()
            .filter_map(|s| s.z_score.map(|z| (s.pair, z)))
            .collect()
    }

    /// Significant pairs with node labels resolved through `graph`
    pub fn labelled(&self, graph: &BipartiteGraph) -> Vec<(String, String, f64)> {
        self.significant
            .iter()
            .map(|s| {
                (
                    graph.display_label(s.pair.first),
                    graph.display_label(s.pair.second),
                    s.z_score,
                )
            })
            .collect()
    }

    /// True when every sample got all the swaps it asked for
    pub fn fully_randomized(&self) -> bool {
        self.exhausted_samples == 0 && !self.stopped_early
    }
}

/// Runs the full co-occurrence significance analysis for one config.
#[derive(Debug, Clone, Default)]
pub struct FdsmPipeline {
    config: FdsmConfig,
}

impl FdsmPipeline {
    pub fn new(config: FdsmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FdsmConfig {
        &self.config
    }

    /// Execute the pipeline on `graph`.
    ///
    /// The `observer` sees every snapshot and may end the run early; pass
    /// [`NoopObserver`](super::observer::NoopObserver) for none. A nonzero
    /// `progress_interval` adds a [`ProgressLogger`] alongside it.
    ///
    /// # Errors
    ///
    /// Invalid config, a non-bipartite graph or an isolated top node. No
    /// statistical degeneracy is reported as an error.
    pub fn run(
        &self,
        graph: &mut BipartiteGraph,
        observer: &mut impl SamplingObserver,
    ) -> Result<FdsmReport> {
        let cfg = &self.config;
        let clock = StageClock::start();
        let mut progress = (cfg.progress_interval > 0)
            .then(|| ProgressLogger::new(cfg.progress_interval));

        // Stage 1: Validate
        let mut sampler = {
            trace_stage!(STAGE_VALIDATE);
            cfg.validate()?;
            let top = graph.top_nodes();
            NullModelSampler::new(
                graph,
                top,
                cfg.nsample,
                EdgeSwapRandomizer::from_config(cfg),
                rng_from_seed(cfg.seed),
            )?
        };

        // Stage 2: Project
        let mut acc = {
            trace_stage!(STAGE_PROJECT);
            let observed = sampler.graph();
            let projection = WeightedProjection::from_graph(observed);
            debug!(
                edges = observed.edge_count(),
                tracked_pairs = projection.len(),
                "projected observed graph"
            );
            CooccurrenceAccumulator::with_raw_counts(&projection, observed, cfg.record_raw_counts)
        };

        // Stage 3: Sample
        let mut samples_drawn = 0;
        let mut swaps_requested: usize = 0;
        let mut swaps_performed = 0;
        let mut exhausted_samples = 0;
        let mut stopped_early = false;
        {
            trace_stage!(STAGE_SAMPLE);
            observer.on_run_start(cfg.nsample, acc.len());
            if let Some(p) = progress.as_mut() {
                p.on_run_start(cfg.nsample, acc.len());
            }

            while let Some(snapshot) = sampler.next_snapshot() {
                let snapshot = snapshot?;
                acc.record_snapshot(snapshot.graph);

                samples_drawn = snapshot.index;
                swaps_requested = swaps_requested.saturating_add(snapshot.outcome.requested);
                swaps_performed += snapshot.outcome.performed;
                if snapshot.outcome.is_exhausted() {
                    exhausted_samples += 1;
                }

                let report = SampleReport {
                    index: snapshot.index,
                    total: cfg.nsample,
                    outcome: snapshot.outcome,
                };
                observer.on_sample(&report);
                if let Some(p) = progress.as_mut() {
                    p.on_sample(&report);
                }
                if snapshot.index < cfg.nsample && observer.should_stop() {
                    stopped_early = true;
                    break;
                }
            }

            if stopped_early {
                warn!(
                    drawn = samples_drawn,
                    requested = cfg.nsample,
                    "sampling stopped early on request"
                );
            }
            if exhausted_samples > 0 {
                debug!(exhausted_samples, "samples ended with fewer swaps than requested");
            }
        }
        drop(sampler);

        // Stage 4: Score
        let (summaries, significant) = {
            trace_stage!(STAGE_SCORE);
            let engine = ZScoreEngine::from_config(cfg);
            let summaries = engine.summarize(&acc);
            let significant = engine.significant(&summaries);
            (summaries, significant)
        };

        let run = RunReport {
            samples_drawn,
            samples_requested: cfg.nsample,
            tracked_pairs: acc.len(),
            elapsed: clock.elapsed(),
            stopped_early,
        };
        observer.on_run_end(&run);
        if let Some(p) = progress.as_mut() {
            p.on_run_end(&run);
        }

        Ok(FdsmReport {
            significant,
            summaries,
            samples_requested: cfg.nsample,
            samples_drawn,
            swaps_requested,
            swaps_performed,
            exhausted_samples,
            stopped_early,
            raw_counts: acc.raw_log(graph),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::observer::{NoopObserver, StopFlag};

    fn triangle() -> BipartiteGraph {
        BipartiteGraph::from_edges([
            ("A", "x"),
            ("A", "y"),
            ("B", "x"),
            ("B", "z"),
            ("C", "y"),
            ("C", "z"),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_samples_gives_empty_output() {
        let mut g = triangle();
        let pipeline = FdsmPipeline::new(FdsmConfig::default().with_nsample(0).with_seed(1));
        let report = pipeline.run(&mut g, &mut NoopObserver).unwrap();

        assert_eq!(report.summaries.len(), 3);
        for s in &report.summaries {
            assert_eq!(s.mean, 1.0);
            assert_eq!(s.stdev, 0.0);
            assert_eq!(s.z_score, None);
        }
        assert!(report.significant.is_empty());
        assert_eq!(report.samples_drawn, 0);
    }

    #[test]
    fn test_report_counts() {
        let mut g = triangle();
        let cfg = FdsmConfig::default().with_nsample(25).with_seed(4);
        let report = FdsmPipeline::new(cfg).run(&mut g, &mut NoopObserver).unwrap();

        assert_eq!(report.samples_drawn, 25);
        assert_eq!(report.swaps_requested, 25);
        assert!(report.swaps_performed <= 25);
        assert_eq!(
            report.swaps_performed + report.exhausted_samples,
            report.swaps_requested
        );
        assert!(!report.stopped_early);
        assert!(report.raw_counts.is_none());
    }

    #[test]
    fn test_stop_flag_ends_run_after_current_sample() {
        let mut g = triangle();
        let flag = StopFlag::new();
        flag.request_stop();
        let mut obs = flag.clone();

        let cfg = FdsmConfig::default().with_nsample(10).with_seed(8);
        let report = FdsmPipeline::new(cfg).run(&mut g, &mut obs).unwrap();

        assert_eq!(report.samples_drawn, 1);
        assert!(report.stopped_early);
        assert!(!report.fully_randomized());
    }

    #[test]
    fn test_raw_counts_recorded_on_request() {
        let mut g = triangle();
        let cfg = FdsmConfig::default()
            .with_nsample(4)
            .with_seed(3)
            .with_raw_counts(true);
        let report = FdsmPipeline::new(cfg).run(&mut g, &mut NoopObserver).unwrap();

        let raw = report.raw_counts.unwrap();
        assert_eq!(raw.len(), 3);
        for (_, _, series) in raw.iter() {
            assert_eq!(series.len(), 5);
            assert_eq!(series[0], 1);
        }
    }

    #[test]
    fn test_huge_nswap_saturates_requested_count() {
        let mut g = triangle();
        let cfg: FdsmConfig =
            serde_json::from_str(r#"{"nsample":3,"nswap":18446744073709551615,"seed":1}"#)
                .unwrap();
        assert!(cfg.validate().is_ok());

        let report = FdsmPipeline::new(cfg).run(&mut g, &mut NoopObserver).unwrap();

        assert_eq!(report.samples_drawn, 3);
        assert_eq!(report.swaps_requested, usize::MAX);
        assert_eq!(report.exhausted_samples, 3);
        assert!(report.swaps_performed <= 3 * 100);
    }

    #[derive(Default)]
    struct CallCounter {
        started: usize,
        ended: usize,
    }

    impl SamplingObserver for CallCounter {
        fn on_run_start(&mut self, _total: usize, _tracked_pairs: usize) {
            self.started += 1;
        }

        fn on_run_end(&mut self, _report: &RunReport) {
            self.ended += 1;
        }
    }

    #[test]
    fn test_graph_errors_surface_before_observer_starts() {
        let mut g = triangle();
        let x = g.node_id("x").unwrap();
        let y = g.node_id("y").unwrap();
        g.add_edge(x, y).unwrap();

        let mut counter = CallCounter::default();
        let err = FdsmPipeline::new(FdsmConfig::default().with_seed(0))
            .run(&mut g, &mut counter)
            .unwrap_err();
        assert!(matches!(err, crate::errors::FdsmError::NotBipartite { .. }));

        let mut g = triangle();
        g.add_node("D", crate::types::Partition::Top).unwrap();
        let err = FdsmPipeline::new(FdsmConfig::default().with_seed(0))
            .run(&mut g, &mut counter)
            .unwrap_err();
        assert!(matches!(err, crate::errors::FdsmError::IsolatedTopNode { .. }));

        assert_eq!(counter.started, 0);
        assert_eq!(counter.ended, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut g = triangle();
        let cfg = FdsmConfig::default().with_min_z(f64::INFINITY);
        assert!(FdsmPipeline::new(cfg).run(&mut g, &mut NoopObserver).is_err());
    }
}
