//! Cosine co-occurrence over the biadjacency matrix
//!
//! A lighter alternative to the null-model z-score: rows are the given
//! nodes, columns their neighbors, and every pair of rows with a nonzero
//! cosine similarity is reported. Edges are unweighted, so the similarity of
//! `x` and `y` reduces to `shared / sqrt(deg x * deg y)`.

use crate::errors::{FdsmError, Result};
use crate::graph::{co_occurrence, BipartiteGraph};
use crate::types::NodeId;
use rayon::prelude::*;

/// Rows at or above this count compare pairs in parallel.
const PARALLEL_ROW_THRESHOLD: usize = 512;

/// Cosine similarity of every pair `i < j` of `nodes` that shares at least
/// one neighbor, in row order.
///
/// Nodes without neighbors produce no pairs.
///
/// # Errors
///
/// [`FdsmError::UnknownNode`] when a node is not in the graph.
pub fn cosine_cooccurrences(
    graph: &BipartiteGraph,
    nodes: &[NodeId],
) -> Result<Vec<((NodeId, NodeId), f64)>> {
    if let Some(missing) = nodes.iter().find(|n| graph.partition(**n).is_none()) {
        return Err(FdsmError::unknown_node(missing.to_string()));
    }

    let row = |i: usize| -> Vec<((NodeId, NodeId), f64)> {
        let x = nodes[i];
        let dx = graph.degree(x);
        if dx == 0 {
            return Vec::new();
        }
        nodes[i + 1..]
            .iter()
            .filter_map(|&y| {
                let dy = graph.degree(y);
                if dy == 0 || x == y {
                    return None;
                }
                let shared = co_occurrence(graph, x, y);
                if shared == 0 {
                    return None;
                }
                let similarity = f64::from(shared) / ((dx * dy) as f64).sqrt();
                Some(((x, y), similarity))
            })
            .collect()
    };

    let pairs = if nodes.len() < PARALLEL_ROW_THRESHOLD {
        (0..nodes.len()).flat_map(row).collect()
    } else {
        (0..nodes.len()).into_par_iter().flat_map_iter(row).collect()
    };
    Ok(pairs)
}
