//! Markov chain over degree-preserving graphs
//!
//! Each snapshot is the *same* graph advanced by a few more swaps, not an
//! independent draw from the original. Consecutive snapshots are therefore
//! correlated; in exchange no graph is ever cloned.

use super::swap::{ensure_swappable, EdgeSwapRandomizer, SwapOutcome};
use crate::errors::Result;
use crate::graph::BipartiteGraph;
use crate::types::NodeId;
use rand::Rng;
use std::ops::ControlFlow;

/// A view of the shared graph after one more randomization step.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'g> {
    /// 1-based sample index (index 0 is the observed graph)
    pub index: usize,
    /// Swaps carried out to reach this snapshot
    pub outcome: SwapOutcome,
    pub graph: &'g BipartiteGraph,
}

/// Streams `nsample` randomized snapshots of an exclusively borrowed graph.
///
/// Snapshots borrow the graph, so this is a lending iterator: drive it with
/// `while let Some(snapshot) = sampler.next_snapshot()` or
/// [`for_each_snapshot`](Self::for_each_snapshot). When the sampler is
/// dropped the graph stays in its last randomized state.
pub struct NullModelSampler<'g, R> {
    graph: &'g mut BipartiteGraph,
    top: Vec<NodeId>,
    randomizer: EdgeSwapRandomizer,
    rng: R,
    nsample: usize,
    drawn: usize,
}

impl<'g, R: Rng> NullModelSampler<'g, R> {
    /// Prepare a sampler.
    ///
    /// # Errors
    ///
    /// Fails before any swap if the graph is not bipartite or a top node is
    /// unknown, misplaced or isolated.
    pub fn new(
        graph: &'g mut BipartiteGraph,
        top: Vec<NodeId>,
        nsample: usize,
        randomizer: EdgeSwapRandomizer,
        rng: R,
    ) -> Result<Self> {
        graph.check_bipartite()?;
        ensure_swappable(graph, &top)?;

        Ok(Self {
            graph,
            top,
            randomizer,
            rng,
            nsample,
            drawn: 0,
        })
    }

    /// Advance the chain and return the next snapshot, or `None` once
    /// `nsample` snapshots have been produced.
    pub fn next_snapshot(&mut self) -> Option<Result<Snapshot<'_>>> {
        if self.drawn >= self.nsample {
            return None;
        }

        let outcome = match self
            .randomizer
            .randomize(&mut *self.graph, &self.top, &mut self.rng)
        {
            Ok(outcome) => outcome,
            Err(err) => return Some(Err(err)),
        };
        self.drawn += 1;

        Some(Ok(Snapshot {
            index: self.drawn,
            outcome,
            graph: &*self.graph,
        }))
    }

    /// Drive the chain to the end, or until `f` breaks.
    ///
    /// Returns the number of snapshots handed to `f`.
    pub fn for_each_snapshot<F>(&mut self, mut f: F) -> Result<usize>
    where
        F: FnMut(Snapshot<'_>) -> ControlFlow<()>,
    {
        let mut seen = 0;
        while let Some(snapshot) = self.next_snapshot() {
            seen += 1;
            if f(snapshot?).is_break() {
                break;
            }
        }
        Ok(seen)
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn remaining(&self) -> usize {
        self.nsample - self.drawn
    }

    /// Current state of the chain
    pub fn graph(&self) -> &BipartiteGraph {
        self.graph
    }
}
