//! Z-scores against the null distribution
//!
//! `z = (observed - mean) / stdev`, with the mean and population standard
//! deviation taken over all accumulated samples. Two degenerate cases are
//! resolved here rather than raised:
//!
//! - a negative variance (floating-point cancellation) is clamped to zero;
//! - a zero standard deviation carries no information, so the pair gets no
//!   z-score at all and is left out of the ranking.

use super::accumulator::{CooccurrenceAccumulator, PairStats};
use crate::types::{FdsmConfig, NodePair, ScoredPair, VarianceMethod, DEFAULT_MIN_Z};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Null-model statistics of one tracked pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub pair: NodePair,
    /// Co-occurrence weight in the observed graph
    pub observed: u32,
    pub mean: f64,
    pub stdev: f64,
    /// `None` when `stdev == 0`
    pub z_score: Option<f64>,
}

/// Turns accumulated statistics into ranked z-scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreEngine {
    min_z: f64,
    variance: VarianceMethod,
}

impl Default for ZScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ZScoreEngine {
    pub fn new() -> Self {
        Self {
            min_z: DEFAULT_MIN_Z,
            variance: VarianceMethod::SumOfSquares,
        }
    }

    pub fn from_config(config: &FdsmConfig) -> Self {
        Self {
            min_z: config.min_z,
            variance: config.variance,
        }
    }

    pub fn with_min_z(mut self, min_z: f64) -> Self {
        self.min_z = min_z;
        self
    }

    pub fn with_variance(mut self, method: VarianceMethod) -> Self {
        self.variance = method;
        self
    }

    pub fn min_z(&self) -> f64 {
        self.min_z
    }

    /// Mean, standard deviation and z-score of a single pair.
    pub fn summarize_pair(&self, pair: NodePair, observed: u32, stats: &PairStats) -> PairSummary {
        let (mean, variance) = match self.variance {
            VarianceMethod::SumOfSquares => (stats.mean(), stats.variance_sum_of_squares()),
            VarianceMethod::Welford => (stats.welford_mean(), stats.variance_welford()),
        };

        let stdev = if variance >= 0.0 {
            variance.sqrt()
        } else {
            warn!(
                ?pair,
                variance, "negative variance from rounding, clamping stdev to 0"
            );
            0.0
        };

        let difference = f64::from(observed) - mean;
        let z_score = if stdev > 0.0 {
            Some(difference / stdev)
        } else {
            debug!(?pair, difference, stdev, "ignoring pair with zero stdev");
            None
        };

        PairSummary {
            pair,
            observed,
            mean,
            stdev,
            z_score,
        }
    }

    /// Summaries of every tracked pair, in accumulator order
    pub fn summarize(&self, acc: &CooccurrenceAccumulator) -> Vec<PairSummary> {
        let summaries: Vec<PairSummary> = acc
            .iter()
            .map(|(pair, observed, stats)| self.summarize_pair(pair, observed, stats))
            .collect();

        let excluded = summaries.iter().filter(|s| s.z_score.is_none()).count();
        if excluded > 0 {
            warn!(
                excluded,
                total = summaries.len(),
                "pairs without a z-score (zero standard deviation)"
            );
        }
        summaries
    }

    /// `(pair, z)` for every pair that has a z-score
    pub fn z_scores(&self, acc: &CooccurrenceAccumulator) -> Vec<(NodePair, f64)> {
        self.summarize(acc)
            .into_iter()
            .filter_map(|s| s.z_score.map(|z| (s.pair, z)))
            .collect()
    }

    /// Sort descending by z-score and keep only `z > min_z`.
    ///
    /// The sort is stable, so tied scores keep their input order.
    pub fn rank(&self, scores: impl IntoIterator<Item = (NodePair, f64)>) -> Vec<ScoredPair> {
        let mut ranked: Vec<ScoredPair> = scores
            .into_iter()
            .filter(|(_, z)| *z > self.min_z)
            .map(|(pair, z_score)| ScoredPair { pair, z_score })
            .collect();
        ranked.sort_by(|a, b| b.z_score.total_cmp(&a.z_score));
        ranked
    }

    /// Ranked significant pairs from summaries already computed
    pub fn significant(&self, summaries: &[PairSummary]) -> Vec<ScoredPair> {
        self.rank(
            summaries
                .iter()
                .filter_map(|s| s.z_score.map(|z| (s.pair, z))),
        )
    }
}
