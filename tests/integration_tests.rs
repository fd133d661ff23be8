//! Integration tests for rapid_fdsm

use rand::rngs::StdRng;
use rand::SeedableRng;
use rapid_fdsm::pipeline::{RunReport, SampleReport};
use rapid_fdsm::*;

/// Authors (bottom) on papers (top). Alice and Bob write together far more
/// often than their degrees alone would suggest.
const PAPERS: &[(&str, &str)] = &[
    ("p1", "alice"),
    ("p1", "bob"),
    ("p2", "alice"),
    ("p2", "bob"),
    ("p3", "alice"),
    ("p3", "bob"),
    ("p4", "alice"),
    ("p4", "bob"),
    ("p5", "carol"),
    ("p5", "dave"),
    ("p6", "carol"),
    ("p6", "erin"),
    ("p7", "dave"),
    ("p7", "erin"),
    ("p8", "frank"),
    ("p8", "carol"),
    ("p9", "frank"),
    ("p9", "dave"),
    ("p10", "erin"),
    ("p10", "frank"),
];

fn papers() -> BipartiteGraph {
    BipartiteGraph::from_edges(PAPERS.iter().copied()).unwrap()
}

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
fn test_triangle_without_samples_is_empty() {
    let mut g = triangle();
    let config = FdsmConfig::default().with_nsample(0).with_seed(0);

    let significant = cooccurrences(&mut g, &config).unwrap();
    assert!(significant.is_empty());

    let mut g = triangle();
    assert!(z_scores(&mut g, &config).unwrap().is_empty());
}

#[test]
fn test_forced_swap() {
    let mut g = BipartiteGraph::from_edges([("A", "x"), ("B", "y")]).unwrap();
    let [a, b, x, y] = ["A", "B", "x", "y"].map(|l| g.node_id(l).unwrap());
    let top = g.top_nodes();

    let mut rng = StdRng::seed_from_u64(11);
    let outcome = EdgeSwapRandomizer::new()
        .with_max_tries(1_000)
        .randomize(&mut g, &top, &mut rng)
        .unwrap();

    assert_eq!(outcome.performed, 1);
    assert!(g.has_edge(a, y));
    assert!(g.has_edge(b, x));
    assert!(!g.has_edge(a, x));
    assert!(!g.has_edge(b, y));
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn test_full_run_output_is_ranked_and_filtered() {
    let mut g = papers();
    let config = FdsmConfig::default()
        .with_nsample(400)
        .with_nswap(3)
        .with_max_tries(300)
        .with_min_z(0.5)
        .with_seed(2024);

    let report = FdsmPipeline::new(config.clone())
        .run(&mut g, &mut NoopObserver)
        .unwrap();

    assert_eq!(report.samples_drawn, 400);
    for s in &report.significant {
        assert!(s.z_score > config.min_z);
    }
    for w in report.significant.windows(2) {
        assert!(w[0].z_score >= w[1].z_score);
    }

    // Every pair with a z-score above the threshold is reported.
    let expected = report
        .z_scores()
        .iter()
        .filter(|(_, z)| *z > config.min_z)
        .count();
    assert_eq!(report.significant.len(), expected);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let config = FdsmConfig::default()
        .with_nsample(50)
        .with_nswap(2)
        .with_min_z(-100.0)
        .with_seed(99);

    let mut g1 = papers();
    let mut g2 = papers();
    let r1 = cooccurrences(&mut g1, &config).unwrap();
    let r2 = cooccurrences(&mut g2, &config).unwrap();

    assert_eq!(r1, r2);
    let e1: Vec<_> = {
        let mut e: Vec<_> = g1.edges().collect();
        e.sort();
        e
    };
    let e2: Vec<_> = {
        let mut e: Vec<_> = g2.edges().collect();
        e.sort();
        e
    };
    assert_eq!(e1, e2);
}

#[test]
fn test_summaries_match_raw_counts() {
    let mut g = papers();
    let config = FdsmConfig::default()
        .with_nsample(30)
        .with_seed(5)
        .with_raw_counts(true);

    let report = FdsmPipeline::new(config).run(&mut g, &mut NoopObserver).unwrap();
    let raw = report.raw_counts.as_ref().unwrap();

    for s in &report.summaries {
        let first = g.display_label(s.pair.first);
        let second = g.display_label(s.pair.second);
        let series = raw.series(&first, &second).unwrap();
        assert_eq!(series.len(), 31);
        assert_eq!(series[0], s.observed);

        let n = series.len() as f64;
        let mean = series.iter().map(|&c| f64::from(c)).sum::<f64>() / n;
        let var = series
            .iter()
            .map(|&c| (f64::from(c) - mean).powi(2))
            .sum::<f64>()
            / n;
        assert!((s.mean - mean).abs() < 1e-9);
        assert!((s.stdev - var.sqrt()).abs() < 1e-9);

        match s.z_score {
            Some(z) => assert!((z - (f64::from(s.observed) - mean) / var.sqrt()).abs() < 1e-9),
            None => assert!(var.sqrt() < 1e-9),
        }
    }
}

#[test]
fn test_raw_log_json_roundtrip_through_file() {
    let mut g = triangle();
    let config = FdsmConfig::default()
        .with_nsample(3)
        .with_seed(1)
        .with_raw_counts(true);
    let report = FdsmPipeline::new(config).run(&mut g, &mut NoopObserver).unwrap();
    let raw = report.raw_counts.unwrap();

    let path = std::env::temp_dir().join(format!("rapid_fdsm_raw_{}.json", std::process::id()));
    raw.write_json(&path).unwrap();
    let restored = RawSampleLog::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored, raw);
}

#[derive(Default)]
struct Recorder {
    started: Option<(usize, usize)>,
    samples: Vec<usize>,
    finished: Option<RunReport>,
    stop_after: Option<usize>,
}

impl SamplingObserver for Recorder {
    fn on_run_start(&mut self, total: usize, tracked_pairs: usize) {
        self.started = Some((total, tracked_pairs));
    }

    fn on_sample(&mut self, report: &SampleReport) {
        self.samples.push(report.index);
    }

    fn on_run_end(&mut self, report: &RunReport) {
        self.finished = Some(*report);
    }

    fn should_stop(&self) -> bool {
        self.stop_after
            .is_some_and(|limit| self.samples.len() >= limit)
    }
}

#[test]
fn test_observer_sees_every_sample() {
    let mut g = triangle();
    let mut recorder = Recorder::default();
    let config = FdsmConfig::default().with_nsample(6).with_seed(3);

    FdsmPipeline::new(config).run(&mut g, &mut recorder).unwrap();

    assert_eq!(recorder.started, Some((6, 3)));
    assert_eq!(recorder.samples, vec![1, 2, 3, 4, 5, 6]);
    let finished = recorder.finished.unwrap();
    assert_eq!(finished.samples_drawn, 6);
    assert!(!finished.stopped_early);
}

#[test]
fn test_observer_can_stop_early() {
    let mut g = papers();
    let mut recorder = Recorder {
        stop_after: Some(4),
        ..Default::default()
    };
    let config = FdsmConfig::default().with_nsample(100).with_seed(3);

    let report = FdsmPipeline::new(config).run(&mut g, &mut recorder).unwrap();

    assert_eq!(report.samples_drawn, 4);
    assert!(report.stopped_early);
    assert!(recorder.finished.unwrap().stopped_early);
}

#[test]
fn test_stop_flag_from_another_thread() {
    let mut g = papers();
    let flag = StopFlag::new();
    let remote = flag.clone();
    std::thread::spawn(move || remote.request_stop())
        .join()
        .unwrap();

    let mut observer = flag;
    let config = FdsmConfig::default().with_nsample(1_000).with_seed(1);
    let report = FdsmPipeline::new(config).run(&mut g, &mut observer).unwrap();

    assert_eq!(report.samples_drawn, 1);
    assert!(report.stopped_early);
}

#[test]
fn test_not_bipartite_rejected_before_swapping() {
    let mut g = triangle();
    let x = g.node_id("x").unwrap();
    let y = g.node_id("y").unwrap();
    g.add_edge(x, y).unwrap();
    let edges_before = g.edge_count();

    let err = FdsmPipeline::new(FdsmConfig::default().with_seed(0))
        .run(&mut g, &mut NoopObserver)
        .unwrap_err();

    assert!(matches!(err, FdsmError::NotBipartite { .. }));
    assert!(err.is_precondition_violation());
    assert_eq!(g.edge_count(), edges_before);
}

#[test]
fn test_isolated_top_node_rejected() {
    let mut g = triangle();
    g.add_node("D", Partition::Top).unwrap();

    let err = cooccurrences(&mut g, &FdsmConfig::default().with_seed(0)).unwrap_err();
    assert!(matches!(err, FdsmError::IsolatedTopNode { .. }));
}

#[test]
fn test_config_from_json_uses_defaults() {
    let config: FdsmConfig = serde_json::from_str(r#"{"nsample": 25, "seed": 4}"#).unwrap();

    assert_eq!(config.nsample, 25);
    assert_eq!(config.nswap, 1);
    assert_eq!(config.max_tries, 100);
    assert_eq!(config.min_z, DEFAULT_MIN_Z);
    assert_eq!(config.variance, VarianceMethod::SumOfSquares);
    assert!(config.validate().is_ok());
}

#[test]
fn test_welford_run_agrees_with_default() {
    let base = FdsmConfig::default()
        .with_nsample(60)
        .with_min_z(-100.0)
        .with_seed(17);

    let mut g1 = papers();
    let mut g2 = papers();
    let a = z_scores(&mut g1, &base).unwrap();
    let b = z_scores(&mut g2, &base.clone().with_variance(VarianceMethod::Welford)).unwrap();

    assert_eq!(a.len(), b.len());
    for ((pa, za), (pb, zb)) in a.iter().zip(&b) {
        assert_eq!(pa, pb);
        assert!((za - zb).abs() < 1e-6);
    }
}

#[test]
fn test_cosine_on_bottom_nodes() {
    let g = papers();
    let alice = g.node_id("alice").unwrap();
    let bob = g.node_id("bob").unwrap();
    let carol = g.node_id("carol").unwrap();

    let pairs = cosine_cooccurrences(&g, &[alice, bob, carol]).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, (alice, bob));
    assert!((pairs[0].1 - 1.0).abs() < 1e-12);
}
