//! Weighted projection onto the bottom partition
//!
//! Two bottom nodes are linked in the projection when they share at least
//! one top neighbor; the link weight is the number of shared neighbors.

use super::bipartite::BipartiteGraph;
use crate::types::{NodeId, NodePair, Partition};
use rustc_hash::FxHashMap;

/// Co-occurrence weights of every bottom pair sharing a top neighbor.
///
/// Entries are sorted by pair, so iteration order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedProjection {
    entries: Vec<(NodePair, u32)>,
}

impl WeightedProjection {
    /// Project `graph` onto its bottom nodes.
    ///
    /// Each top node contributes one unit of weight to every pair of its
    /// bottom neighbors, so the cost is the sum of squared top degrees.
    pub fn from_graph(graph: &BipartiteGraph) -> Self {
        let mut weights: FxHashMap<NodePair, u32> = FxHashMap::default();

        for top in graph.top_nodes() {
            let bottoms: Vec<NodeId> = graph
                .neighbors(top)
                .iter()
                .copied()
                .filter(|&n| graph.partition(n) == Some(Partition::Bottom))
                .collect();

            for (i, &a) in bottoms.iter().enumerate() {
                for &b in &bottoms[i + 1..] {
                    if let Some(pair) = NodePair::new(a, b) {
                        *weights.entry(pair).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut entries: Vec<(NodePair, u32)> = weights.into_iter().collect();
        entries.sort_unstable_by_key(|(pair, _)| *pair);
        Self { entries }
    }

    /// Build a projection from explicit entries (weights of zero are dropped)
    pub fn from_entries(entries: impl IntoIterator<Item = (NodePair, u32)>) -> Self {
        let mut entries: Vec<(NodePair, u32)> =
            entries.into_iter().filter(|(_, w)| *w > 0).collect();
        entries.sort_unstable_by_key(|(pair, _)| *pair);
        entries.dedup_by_key(|(pair, _)| *pair);
        Self { entries }
    }

    /// Weight of a pair, or `None` if the pair never co-occurs
    pub fn weight(&self, pair: &NodePair) -> Option<u32> {
        self.entries
            .binary_search_by_key(pair, |(p, _)| *p)
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NodePair, u32)> {
        self.entries.iter()
    }

    pub fn pairs(&self) -> impl Iterator<Item = NodePair> + '_ {
        self.entries.iter().map(|(pair, _)| *pair)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Number of neighbors `x` and `y` currently share.
///
/// Scans the smaller neighbor list and probes the edge set, so the cost is
/// O(min(deg x, deg y)).
pub fn co_occurrence(graph: &BipartiteGraph, x: NodeId, y: NodeId) -> u32 {
    let (small, other) = if graph.degree(x) <= graph.degree(y) {
        (x, y)
    } else {
        (y, x)
    };
    graph
        .neighbors(small)
        .iter()
        .filter(|&&t| graph.has_edge(t, other))
        .count() as u32
}
