//! Native Python interface
//!
//! Edges cross the boundary as `(top, bottom)` label tuples; results come
//! back with labels resolved.

use super::to_py_err;
use crate::graph::BipartiteGraph;
use crate::pipeline::{FdsmPipeline, FdsmReport, NoopObserver};
use crate::types::{FdsmConfig, VarianceMethod};
use pyo3::prelude::*;

/// A significant pair of bottom nodes
#[pyclass(name = "ScoredPair")]
#[derive(Clone)]
pub struct PyScoredPair {
    #[pyo3(get)]
    pub first: String,
    #[pyo3(get)]
    pub second: String,
    #[pyo3(get)]
    pub z_score: f64,
}

#[pymethods]
impl PyScoredPair {
    fn __repr__(&self) -> String {
        format!(
            "ScoredPair(first='{}', second='{}', z_score={:.4})",
            self.first, self.second, self.z_score
        )
    }

    fn as_tuple(&self) -> (String, String, f64) {
        (self.first.clone(), self.second.clone(), self.z_score)
    }
}

/// Outcome of a full run
#[pyclass(name = "FdsmResult")]
#[derive(Clone)]
pub struct PyFdsmResult {
    #[pyo3(get)]
    pub pairs: Vec<PyScoredPair>,
    #[pyo3(get)]
    pub samples_drawn: usize,
    #[pyo3(get)]
    pub swaps_performed: usize,
    #[pyo3(get)]
    pub exhausted_samples: usize,
}

#[pymethods]
impl PyFdsmResult {
    fn __repr__(&self) -> String {
        format!(
            "FdsmResult(pairs={}, samples_drawn={}, exhausted_samples={})",
            self.pairs.len(),
            self.samples_drawn,
            self.exhausted_samples
        )
    }

    fn __len__(&self) -> usize {
        self.pairs.len()
    }

    fn __getitem__(&self, idx: usize) -> PyResult<PyScoredPair> {
        self.pairs
            .get(idx)
            .cloned()
            .ok_or_else(|| pyo3::exceptions::PyIndexError::new_err("index out of range"))
    }

    /// Get pairs as a list of (first, second, z_score) tuples
    fn as_tuples(&self) -> Vec<(String, String, f64)> {
        self.pairs.iter().map(PyScoredPair::as_tuple).collect()
    }
}

impl PyFdsmResult {
    fn from_report(report: &FdsmReport, graph: &BipartiteGraph) -> Self {
        Self {
            pairs: report
                .labelled(graph)
                .into_iter()
                .map(|(first, second, z_score)| PyScoredPair {
                    first,
                    second,
                    z_score,
                })
                .collect(),
            samples_drawn: report.samples_drawn,
            swaps_performed: report.swaps_performed,
            exhausted_samples: report.exhausted_samples,
        }
    }
}

/// Configuration for an FDSM run
#[pyclass(name = "FdsmConfig")]
#[derive(Clone)]
pub struct PyFdsmConfig {
    inner: FdsmConfig,
}

#[pymethods]
impl PyFdsmConfig {
    #[new]
    #[pyo3(signature = (
        nsample=10,
        nswap=1,
        max_tries=100,
        min_z=crate::types::DEFAULT_MIN_Z,
        seed=None,
        variance="sum_of_squares",
        progress_interval=0
    ))]
    fn new(
        nsample: usize,
        nswap: usize,
        max_tries: usize,
        min_z: f64,
        seed: Option<u64>,
        variance: &str,
        progress_interval: usize,
    ) -> PyResult<Self> {
        let config = FdsmConfig {
            nsample,
            nswap,
            max_tries,
            min_z,
            seed,
            variance: VarianceMethod::parse(variance),
            record_raw_counts: false,
            progress_interval,
        };
        config.validate().map_err(to_py_err)?;

        Ok(Self { inner: config })
    }

    fn __repr__(&self) -> String {
        format!(
            "FdsmConfig(nsample={}, nswap={}, max_tries={}, min_z={})",
            self.inner.nsample, self.inner.nswap, self.inner.max_tries, self.inner.min_z
        )
    }
}

fn build_graph(edges: Vec<(String, String)>) -> PyResult<BipartiteGraph> {
    BipartiteGraph::from_edges(edges).map_err(to_py_err)
}

fn run(
    py: Python<'_>,
    edges: Vec<(String, String)>,
    config: Option<PyFdsmConfig>,
) -> PyResult<(FdsmReport, BipartiteGraph)> {
    let config = config.map(|c| c.inner).unwrap_or_default();
    let mut graph = build_graph(edges)?;
    let report = py
        .allow_threads(|| FdsmPipeline::new(config).run(&mut graph, &mut NoopObserver))
        .map_err(to_py_err)?;
    Ok((report, graph))
}

/// Significant co-occurrences of the bottom nodes of an edge list.
///
/// Args:
///     edges: list of (top, bottom) label tuples
///     config: optional FdsmConfig
#[pyfunction]
#[pyo3(signature = (edges, config=None))]
pub fn cooccurrences(
    py: Python<'_>,
    edges: Vec<(String, String)>,
    config: Option<PyFdsmConfig>,
) -> PyResult<PyFdsmResult> {
    let (report, graph) = run(py, edges, config)?;
    Ok(PyFdsmResult::from_report(&report, &graph))
}

/// Every z-score, unfiltered and unranked, as (first, second, z) tuples
#[pyfunction]
#[pyo3(signature = (edges, config=None))]
pub fn z_scores(
    py: Python<'_>,
    edges: Vec<(String, String)>,
    config: Option<PyFdsmConfig>,
) -> PyResult<Vec<(String, String, f64)>> {
    let (report, graph) = run(py, edges, config)?;
    Ok(report
        .z_scores()
        .into_iter()
        .map(|(pair, z)| {
            (
                graph.display_label(pair.first),
                graph.display_label(pair.second),
                z,
            )
        })
        .collect())
}

/// Cosine similarity between every pair of `nodes` sharing a neighbor
#[pyfunction]
#[pyo3(signature = (edges, nodes))]
pub fn cosine_cooccurrences(
    edges: Vec<(String, String)>,
    nodes: Vec<String>,
) -> PyResult<Vec<(String, String, f64)>> {
    let graph = build_graph(edges)?;
    let ids = nodes
        .iter()
        .map(|label| {
            graph
                .node_id(label)
                .ok_or_else(|| to_py_err(crate::errors::FdsmError::unknown_node(label.clone())))
        })
        .collect::<PyResult<Vec<_>>>()?;

    let pairs = crate::similarity::cosine_cooccurrences(&graph, &ids).map_err(to_py_err)?;
    Ok(pairs
        .into_iter()
        .map(|((x, y), similarity)| (graph.display_label(x), graph.display_label(y), similarity))
        .collect())
}
