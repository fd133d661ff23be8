//! Mutable bipartite graph
//!
//! Adjacency lists give O(1) uniform neighbor sampling; a hashed edge set
//! gives O(1) membership tests. Both are kept in sync by every mutation.

use crate::errors::{FdsmError, Result};
use crate::types::{NodeId, NodePair, Partition, StringPool};
use rustc_hash::FxHashSet;

/// An undirected simple graph whose nodes are labelled top or bottom.
///
/// Edges are not checked against the partition on insertion; call
/// [`check_bipartite`](Self::check_bipartite) once before randomizing.
#[derive(Debug, Clone, Default)]
pub struct BipartiteGraph {
    labels: StringPool,
    partitions: Vec<Partition>,
    adjacency: Vec<Vec<NodeId>>,
    edges: FxHashSet<NodePair>,
}

impl BipartiteGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            labels: StringPool::with_capacity(node_capacity),
            partitions: Vec::with_capacity(node_capacity),
            adjacency: Vec::with_capacity(node_capacity),
            edges: FxHashSet::with_capacity_and_hasher(edge_capacity, Default::default()),
        }
    }

    /// Build a graph from `(top, bottom)` label pairs.
    ///
    /// Nodes are created on first sight; duplicate edges collapse.
    pub fn from_edges<I, S>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (top, bottom) in edges {
            let t = graph.add_node(top.as_ref(), Partition::Top)?;
            let b = graph.add_node(bottom.as_ref(), Partition::Bottom)?;
            graph.add_edge(t, b)?;
        }
        Ok(graph)
    }

    /// Get or create a node, returning its ID.
    ///
    /// Re-adding a label in the same partition returns the existing id;
    /// re-adding it in the other partition is an error.
    pub fn add_node(&mut self, label: &str, partition: Partition) -> Result<NodeId> {
        if let Some(id) = self.labels.lookup(label) {
            if self.partitions[id as usize] != partition {
                return Err(FdsmError::partition_conflict(label));
            }
            return Ok(NodeId(id));
        }

        let id = self.labels.intern(label);
        self.partitions.push(partition);
        self.adjacency.push(Vec::new());
        Ok(NodeId(id))
    }

    /// Insert an undirected edge.
    ///
    /// Returns `Ok(false)` if the edge already exists or `a == b`.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.require(a)?;
        self.require(b)?;
        Ok(self.link(a, b))
    }

    /// Remove an undirected edge, returning whether it existed
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        self.unlink(a, b)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        NodePair::new(a, b).is_some_and(|pair| self.edges.contains(&pair))
    }

    /// Current neighbors of a node (empty for unknown ids)
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    pub fn partition(&self, node: NodeId) -> Option<Partition> {
        self.partitions.get(node.index()).copied()
    }

    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(node.0)
    }

    /// Look up a node by label
    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.labels.lookup(label).map(NodeId)
    }

    /// All nodes of one partition, in id order
    pub fn nodes_in(&self, partition: Partition) -> Vec<NodeId> {
        self.partitions
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == partition)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    pub fn top_nodes(&self) -> Vec<NodeId> {
        self.nodes_in(Partition::Top)
    }

    pub fn bottom_nodes(&self) -> Vec<NodeId> {
        self.nodes_in(Partition::Bottom)
    }

    pub fn node_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Degree of every node, indexed by node id
    pub fn degree_sequence(&self) -> Vec<usize> {
        self.adjacency.iter().map(Vec::len).collect()
    }

    /// Iterate over all edges as canonical pairs
    pub fn edges(&self) -> impl Iterator<Item = NodePair> + '_ {
        self.edges.iter().copied()
    }

    /// Verify that every edge joins a top node to a bottom node
    pub fn check_bipartite(&self) -> Result<()> {
        for pair in &self.edges {
            if self.partitions[pair.first.index()] == self.partitions[pair.second.index()] {
                return Err(FdsmError::not_bipartite(
                    self.display_label(pair.first),
                    self.display_label(pair.second),
                ));
            }
        }
        Ok(())
    }

    /// Label for diagnostics, falling back to the raw id
    pub fn display_label(&self, node: NodeId) -> String {
        self.label(node)
            .map(str::to_string)
            .unwrap_or_else(|| node.to_string())
    }

    fn require(&self, node: NodeId) -> Result<()> {
        if node.index() < self.partitions.len() {
            Ok(())
        } else {
            Err(FdsmError::unknown_node(format!(
                "{} (graph has {} nodes)",
                node,
                self.partitions.len()
            )))
        }
    }

    /// Insert without bounds checks on the ids; callers guarantee both exist.
    pub(crate) fn link(&mut self, a: NodeId, b: NodeId) -> bool {
        let Some(pair) = NodePair::new(a, b) else {
            return false;
        };
        if !self.edges.insert(pair) {
            return false;
        }
        self.adjacency[a.index()].push(b);
        self.adjacency[b.index()].push(a);
        true
    }

    pub(crate) fn unlink(&mut self, a: NodeId, b: NodeId) -> bool {
        let Some(pair) = NodePair::new(a, b) else {
            return false;
        };
        if !self.edges.remove(&pair) {
            return false;
        }
        detach(&mut self.adjacency[a.index()], b);
        detach(&mut self.adjacency[b.index()], a);
        true
    }
}

fn detach(list: &mut Vec<NodeId>, node: NodeId) {
    if let Some(pos) = list.iter().position(|&n| n == node) {
        list.swap_remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_from_edges_basic() {
        let g = triangle();
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 6);
        assert_eq!(g.top_nodes().len(), 3);
        assert_eq!(g.bottom_nodes().len(), 3);
        assert!(g.degree_sequence().iter().all(|&d| d == 2));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let g = BipartiteGraph::from_edges([("A", "x"), ("A", "x")]).unwrap();
        assert_eq!(g.edge_count(), 1);
        let a = g.node_id("A").unwrap();
        assert_eq!(g.degree(a), 1);
    }

    #[test]
    fn test_partition_conflict() {
        let err = BipartiteGraph::from_edges([("A", "x"), ("x", "y")]).unwrap_err();
        assert!(matches!(err, FdsmError::PartitionConflict { .. }));
    }

    #[test]
    fn test_add_remove_keeps_adjacency_in_sync() {
        let mut g = BipartiteGraph::new();
        let a = g.add_node("A", Partition::Top).unwrap();
        let x = g.add_node("x", Partition::Bottom).unwrap();
        assert!(g.add_edge(a, x).unwrap());
        assert!(!g.add_edge(x, a).unwrap());
        assert!(g.has_edge(x, a));
        assert_eq!(g.neighbors(a), &[x]);

        assert!(g.remove_edge(x, a));
        assert!(!g.remove_edge(a, x));
        assert!(g.neighbors(a).is_empty());
        assert!(g.neighbors(x).is_empty());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_self_loops_ignored() {
        let mut g = BipartiteGraph::new();
        let a = g.add_node("A", Partition::Top).unwrap();
        assert!(!g.add_edge(a, a).unwrap());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut g = BipartiteGraph::new();
        let a = g.add_node("A", Partition::Top).unwrap();
        let err = g.add_edge(a, NodeId(42)).unwrap_err();
        assert!(matches!(err, FdsmError::UnknownNode { .. }));
        assert!(g.neighbors(NodeId(42)).is_empty());
    }

    #[test]
    fn test_check_bipartite() {
        let mut g = triangle();
        assert!(g.check_bipartite().is_ok());

        let a = g.node_id("A").unwrap();
        let b = g.node_id("B").unwrap();
        g.add_edge(a, b).unwrap();
        let err = g.check_bipartite().unwrap_err();
        assert!(matches!(err, FdsmError::NotBipartite { .. }));
    }
}
