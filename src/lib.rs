//! # rapid_fdsm
//!
//! Statistically significant co-occurrences in bipartite networks, scored
//! against the Fixed Degree Sequence Model with Python bindings.
//!
//! Two bottom nodes co-occur when they share a top-node neighbor. The observed
//! co-occurrence count of every pair is compared with its distribution over a
//! chain of degree-preserving randomizations of the graph, and pairs whose
//! z-score clears a threshold are reported.
//!
//! ## Features
//!
//! - **No graph copies**: samples are successive states of one graph
//! - **Streaming statistics**: per-pair sums, never a sample matrix
//! - **Parallel counting**: large pair sets are measured with rayon
//! - **Python bindings**: via PyO3 behind the `python` feature
//!
//! ```
//! use rapid_fdsm::{cooccurrences, BipartiteGraph, FdsmConfig};
//!
//! let mut graph = BipartiteGraph::from_edges([
//!     ("paper1", "alice"),
//!     ("paper1", "bob"),
//!     ("paper2", "bob"),
//!     ("paper2", "carol"),
//! ])
//! .unwrap();
//! let config = FdsmConfig::default().with_nsample(50).with_seed(7);
//! let significant = cooccurrences(&mut graph, &config).unwrap();
//! assert!(significant.iter().all(|s| s.z_score > config.min_z));
//! ```

pub mod errors;
pub mod graph;
pub mod nullmodel;
pub mod pipeline;
pub mod similarity;
pub mod stats;
pub mod types;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use errors::{FdsmError, Result};
pub use types::{
    FdsmConfig, NodeId, NodePair, Partition, ScoredPair, StringPool, VarianceMethod,
    DEFAULT_MIN_Z,
};

// Re-export main functionality
pub use graph::{co_occurrence, BipartiteGraph, WeightedProjection};
pub use nullmodel::{EdgeSwapRandomizer, NullModelSampler, Snapshot, SwapOutcome};
pub use pipeline::{
    FdsmPipeline, FdsmReport, NoopObserver, ProgressLogger, SamplingObserver, StopFlag,
};
pub use similarity::cosine_cooccurrences;
pub use stats::{CooccurrenceAccumulator, PairStats, PairSummary, RawSampleLog, ZScoreEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Significant co-occurring bottom-node pairs, strongest first.
///
/// Top nodes are the graph's [`Partition::Top`] nodes. `graph` is left in
/// its final randomized state.
pub fn cooccurrences(graph: &mut BipartiteGraph, config: &FdsmConfig) -> Result<Vec<ScoredPair>> {
    let report = FdsmPipeline::new(config.clone()).run(graph, &mut NoopObserver)?;
    Ok(report.significant)
}

/// Unfiltered `(pair, z)` for every tracked pair with a nonzero null stdev.
pub fn z_scores(graph: &mut BipartiteGraph, config: &FdsmConfig) -> Result<Vec<(NodePair, f64)>> {
    let report = FdsmPipeline::new(config.clone()).run(graph, &mut NoopObserver)?;
    Ok(report.z_scores())
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Initialize the Python module
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register_module(m)?;
    Ok(())
}
