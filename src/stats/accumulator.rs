//! Streaming co-occurrence statistics
//!
//! Every tracked pair keeps a count, a running sum and a running sum of
//! squares of its co-occurrence across samples, alongside Welford's running
//! mean and M2. Sample 0 is always the observed graph.

use super::raw_log::RawSampleLog;
use crate::graph::{co_occurrence, BipartiteGraph, WeightedProjection};
use crate::types::NodePair;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Below this many tracked pairs, counting runs on the calling thread.
const PARALLEL_PAIR_THRESHOLD: usize = 4096;

/// Running statistics for one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    /// Number of data points seen
    pub count: u64,
    /// Sum of co-occurrence counts
    pub sum: f64,
    /// Sum of squared co-occurrence counts
    pub sum_sq: f64,
    welford_mean: f64,
    welford_m2: f64,
}

impl PairStats {
    /// Add one data point
    pub fn push(&mut self, value: u32) {
        let v = f64::from(value);
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;

        let delta = v - self.welford_mean;
        self.welford_mean += delta / self.count as f64;
        self.welford_m2 += delta * (v - self.welford_mean);
    }

    /// `sum / count`
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Population variance via `sum_sq / n - mean²`.
    ///
    /// Not clamped: floating-point cancellation can make this slightly
    /// negative.
    pub fn variance_sum_of_squares(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        self.sum_sq / self.count as f64 - mean * mean
    }

    pub fn welford_mean(&self) -> f64 {
        self.welford_mean
    }

    /// Population variance from Welford's M2 (never negative)
    pub fn variance_welford(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.welford_m2 / self.count as f64
    }
}

/// Accumulates co-occurrence counts of the observed projection's pairs
/// over the observed graph and every randomized snapshot.
///
/// Only pairs present in the observed projection are tracked; pairs that
/// first co-occur in a randomized graph are ignored.
#[derive(Debug, Clone)]
pub struct CooccurrenceAccumulator {
    pairs: Vec<NodePair>,
    observed: Vec<u32>,
    stats: Vec<PairStats>,
    raw: Option<Vec<Vec<u32>>>,
}

impl CooccurrenceAccumulator {
    /// Start accumulating, recording `original` as sample 0.
    pub fn new(projection: &WeightedProjection, original: &BipartiteGraph) -> Self {
        Self::with_raw_counts(projection, original, false)
    }

    /// Like [`new`](Self::new), optionally keeping every count series.
    pub fn with_raw_counts(
        projection: &WeightedProjection,
        original: &BipartiteGraph,
        record_raw: bool,
    ) -> Self {
        let (pairs, observed): (Vec<NodePair>, Vec<u32>) = projection.iter().copied().unzip();
        let mut acc = Self {
            stats: vec![PairStats::default(); pairs.len()],
            raw: record_raw.then(|| vec![Vec::new(); pairs.len()]),
            pairs,
            observed,
        };
        acc.record_snapshot(original);
        acc
    }

    /// Measure every tracked pair on `graph` and add one data point each.
    pub fn record_snapshot(&mut self, graph: &BipartiteGraph) {
        let counts = self.count_pairs(graph);

        for (stats, &count) in self.stats.iter_mut().zip(&counts) {
            stats.push(count);
        }
        if let Some(raw) = self.raw.as_mut() {
            for (series, &count) in raw.iter_mut().zip(&counts) {
                series.push(count);
            }
        }
    }

    fn count_pairs(&self, graph: &BipartiteGraph) -> Vec<u32> {
        let measure = |pair: &NodePair| co_occurrence(graph, pair.first, pair.second);

        if self.pairs.len() < PARALLEL_PAIR_THRESHOLD {
            self.pairs.iter().map(measure).collect()
        } else {
            self.pairs.par_iter().map(measure).collect()
        }
    }

    /// Data points recorded so far (the observed graph included)
    pub fn samples(&self) -> u64 {
        self.stats.first().map_or(0, |s| s.count)
    }

    /// Iterate over `(pair, observed weight, stats)` in projection order
    pub fn iter(&self) -> impl Iterator<Item = (NodePair, u32, &PairStats)> {
        self.pairs
            .iter()
            .zip(&self.observed)
            .zip(&self.stats)
            .map(|((pair, obs), stats)| (*pair, *obs, stats))
    }

    pub fn stats(&self, pair: &NodePair) -> Option<&PairStats> {
        self.pairs
            .binary_search(pair)
            .ok()
            .map(|idx| &self.stats[idx])
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Export the recorded count series, labelled through `graph`.
    ///
    /// `None` unless raw counts were requested at construction.
    pub fn raw_log(&self, graph: &BipartiteGraph) -> Option<RawSampleLog> {
        let raw = self.raw.as_ref()?;
        Some(RawSampleLog::from_series(
            self.pairs.iter().zip(raw).map(|(pair, series)| {
                (
                    graph.display_label(pair.first),
                    graph.display_label(pair.second),
                    series.clone(),
                )
            }),
        ))
    }
}
