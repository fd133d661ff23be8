//! JSON interface for large graphs and batch processing
//!
//! One JSON string in, one out: edge lists and config cross the boundary
//! without building Python objects per edge.

use super::to_py_err;
use crate::errors::Result;
use crate::graph::BipartiteGraph;
use crate::pipeline::{FdsmPipeline, NoopObserver};
use crate::stats::RawSampleLog;
use crate::types::FdsmConfig;
use pyo3::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Input graph from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct JsonGraph {
    /// `[top, bottom]` label pairs
    pub edges: Vec<(String, String)>,
    #[serde(default)]
    pub config: Option<FdsmConfig>,
}

/// Output pair for JSON
#[derive(Debug, Clone, Serialize)]
pub struct JsonPair {
    pub first: String,
    pub second: String,
    pub z_score: f64,
}

/// Output result for JSON
#[derive(Debug, Clone, Serialize)]
pub struct JsonResult {
    pub pairs: Vec<JsonPair>,
    pub samples_drawn: usize,
    pub swaps_requested: usize,
    pub swaps_performed: usize,
    pub exhausted_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_counts: Option<RawSampleLog>,
}

fn run_graph(input: JsonGraph) -> Result<JsonResult> {
    let config = input.config.unwrap_or_default();
    let mut graph = BipartiteGraph::from_edges(input.edges)?;
    let report = FdsmPipeline::new(config).run(&mut graph, &mut NoopObserver)?;

    Ok(JsonResult {
        pairs: report
            .labelled(&graph)
            .into_iter()
            .map(|(first, second, z_score)| JsonPair {
                first,
                second,
                z_score,
            })
            .collect(),
        samples_drawn: report.samples_drawn,
        swaps_requested: report.swaps_requested,
        swaps_performed: report.swaps_performed,
        exhausted_samples: report.exhausted_samples,
        raw_counts: report.raw_counts,
    })
}

/// Significant co-occurrences from JSON input
///
/// Args:
///     json_input: JSON object with `edges` and optional `config`
///
/// Returns:
///     JSON string with ranked pairs and run counters
#[pyfunction]
#[pyo3(signature = (json_input))]
pub fn cooccurrences_from_json(py: Python<'_>, json_input: &str) -> PyResult<String> {
    let input: JsonGraph = serde_json::from_str(json_input)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(format!("Invalid JSON: {}", e)))?;

    let result = py.allow_threads(|| run_graph(input)).map_err(to_py_err)?;

    serde_json::to_string(&result)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Batch variant over an array of graphs, processed in parallel
///
/// Each graph runs with its own config and RNG; one failing graph fails the
/// whole batch.
#[pyfunction]
#[pyo3(signature = (json_input))]
pub fn cooccurrences_batch_from_json(py: Python<'_>, json_input: &str) -> PyResult<String> {
    let inputs: Vec<JsonGraph> = serde_json::from_str(json_input)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(format!("Invalid JSON: {}", e)))?;

    let results = py
        .allow_threads(|| {
            inputs
                .into_par_iter()
                .map(run_graph)
                .collect::<Result<Vec<JsonResult>>>()
        })
        .map_err(to_py_err)?;

    serde_json::to_string(&results)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}
