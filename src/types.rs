//! Core types for rapid_fdsm
//!
//! Node handles, partitions, canonical node pairs, label interning and the
//! run configuration shared by every stage.

use crate::errors::{FdsmError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Label Interning
// ============================================================================

/// Interns node labels so the graph can work on dense `u32` ids.
///
/// Each label is stored once; `intern` is idempotent.
#[derive(Debug, Default, Clone)]
pub struct StringPool {
    string_to_id: FxHashMap<Arc<str>, u32>,
    id_to_string: Vec<Arc<str>>,
}

impl StringPool {
    /// Create a new empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            string_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            id_to_string: Vec::with_capacity(capacity),
        }
    }

    /// Intern a label, returning its ID
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.string_to_id.get(s) {
            return id;
        }

        let id = self.id_to_string.len() as u32;
        let arc: Arc<str> = s.into();
        self.string_to_id.insert(arc.clone(), id);
        self.id_to_string.push(arc);
        id
    }

    /// Look up a label without interning it
    pub fn lookup(&self, s: &str) -> Option<u32> {
        self.string_to_id.get(s).copied()
    }

    /// Get a label by its ID
    pub fn get(&self, id: u32) -> Option<&str> {
        self.id_to_string.get(id as usize).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.id_to_string.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_string.is_empty()
    }
}

// ============================================================================
// Nodes & Pairs
// ============================================================================

/// Dense handle of a node inside a [`BipartiteGraph`](crate::graph::BipartiteGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side of the bipartition a node belongs to.
///
/// Top nodes are the ones whose neighborhoods induce co-occurrence
/// (documents, papers, baskets); bottom nodes are the ones being paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Top,
    Bottom,
}

/// An unordered pair of distinct nodes, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePair {
    pub first: NodeId,
    pub second: NodeId,
}

impl NodePair {
    /// Build the canonical pair for `a` and `b`.
    ///
    /// Returns `None` when `a == b`.
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.first == node || self.second == node
    }
}

/// A pair that passed the significance cutoff, with its z-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub pair: NodePair,
    pub z_score: f64,
}

// ============================================================================
// Variance Method
// ============================================================================

/// How the per-pair variance is derived from the accumulated samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMethod {
    /// `sum_sq / n - mean²`. Exact for the small integer counts this
    /// domain produces; may cancel to a tiny negative value, which is
    /// clamped to zero.
    #[default]
    SumOfSquares,
    /// Welford's incremental update. Never negative, stable for large
    /// magnitudes or very long runs.
    Welford,
}

impl VarianceMethod {
    /// Lenient parse; unrecognized names fall back to the default
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "welford" | "stable" | "online" => VarianceMethod::Welford,
            _ => VarianceMethod::SumOfSquares,
        }
    }
}

impl std::str::FromStr for VarianceMethod {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(VarianceMethod::parse(value))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Two-tailed 99.9% significance level.
pub const DEFAULT_MIN_Z: f64 = 3.29;

fn default_nsample() -> usize {
    10
}
fn default_nswap() -> usize {
    1
}
fn default_max_tries() -> usize {
    100
}
fn default_min_z() -> f64 {
    DEFAULT_MIN_Z
}

/// Configuration for an FDSM co-occurrence run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdsmConfig {
    /// Number of randomized snapshots drawn after the observed graph
    #[serde(default = "default_nsample")]
    pub nsample: usize,
    /// Successful swaps requested between consecutive snapshots
    #[serde(default = "default_nswap")]
    pub nswap: usize,
    /// Iterations allowed per randomization call before giving up
    #[serde(default = "default_max_tries")]
    pub max_tries: usize,
    /// Pairs are reported only when their z-score is strictly greater
    #[serde(default = "default_min_z")]
    pub min_z: f64,
    /// RNG seed; `None` seeds from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Variance derivation
    #[serde(default)]
    pub variance: VarianceMethod,
    /// Keep every per-pair count series for offline inspection
    #[serde(default)]
    pub record_raw_counts: bool,
    /// Log progress every N samples (0 disables)
    #[serde(default)]
    pub progress_interval: usize,
}

impl Default for FdsmConfig {
    fn default() -> Self {
        Self {
            nsample: default_nsample(),
            nswap: default_nswap(),
            max_tries: default_max_tries(),
            min_z: default_min_z(),
            seed: None,
            variance: VarianceMethod::SumOfSquares,
            record_raw_counts: false,
            progress_interval: 0,
        }
    }
}

impl FdsmConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.min_z.is_finite() {
            return Err(FdsmError::invalid_config(format!(
                "min_z must be finite, got {}",
                self.min_z
            )));
        }

        if self.nswap > 0 && self.max_tries == 0 {
            return Err(FdsmError::invalid_config(
                "max_tries must be > 0 when swaps are requested",
            ));
        }

        Ok(())
    }

    /// Number of data points per pair: the observed graph plus every snapshot
    pub fn total_samples(&self) -> usize {
        self.nsample + 1
    }

    pub fn with_nsample(mut self, nsample: usize) -> Self {
        self.nsample = nsample;
        self
    }

    pub fn with_nswap(mut self, nswap: usize) -> Self {
        self.nswap = nswap;
        self
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_min_z(mut self, min_z: f64) -> Self {
        self.min_z = min_z;
        self
    }

    /// Builder method: fix the RNG seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_variance(mut self, method: VarianceMethod) -> Self {
        self.variance = method;
        self
    }

    pub fn with_raw_counts(mut self, record: bool) -> Self {
        self.record_raw_counts = record;
        self
    }

    pub fn with_progress_interval(mut self, every: usize) -> Self {
        self.progress_interval = every;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_pool() {
        let mut pool = StringPool::new();
        let id1 = pool.intern("x");
        let id2 = pool.intern("y");
        let id3 = pool.intern("x");

        assert_eq!(id1, id3);
        assert_ne!(id1, id2);
        assert_eq!(pool.get(id2), Some("y"));
        assert_eq!(pool.lookup("z"), None);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_node_pair_is_canonical() {
        let a = NodePair::new(NodeId(5), NodeId(2)).unwrap();
        let b = NodePair::new(NodeId(2), NodeId(5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.first, NodeId(2));
        assert!(a.contains(NodeId(5)));
        assert!(NodePair::new(NodeId(3), NodeId(3)).is_none());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = FdsmConfig::default();
        assert_eq!(cfg.nsample, 10);
        assert_eq!(cfg.nswap, 1);
        assert_eq!(cfg.max_tries, 100);
        assert!((cfg.min_z - 3.29).abs() < 1e-12);
        assert_eq!(cfg.total_samples(), 11);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(FdsmConfig::default().with_min_z(f64::NAN).validate().is_err());
        assert!(FdsmConfig::default().with_max_tries(0).validate().is_err());
        assert!(FdsmConfig::default()
            .with_nswap(0)
            .with_max_tries(0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_config_serde_partial_uses_defaults() {
        let cfg: FdsmConfig = serde_json::from_str(r#"{"nsample": 50, "seed": 7}"#).unwrap();
        assert_eq!(cfg.nsample, 50);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.nswap, 1);
        assert_eq!(cfg.variance, VarianceMethod::SumOfSquares);
    }

    #[test]
    fn test_variance_method_serde() {
        let json = serde_json::to_string(&VarianceMethod::Welford).unwrap();
        assert_eq!(json, r#""welford""#);
        let back: VarianceMethod = serde_json::from_str(r#""sum_of_squares""#).unwrap();
        assert_eq!(back, VarianceMethod::SumOfSquares);
        assert_eq!("stable".parse::<VarianceMethod>().unwrap(), VarianceMethod::Welford);
    }
}
