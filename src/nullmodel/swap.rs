//! Degree-preserving edge swap
//!
//! Given top nodes `u`, `v` linked to bottom nodes `x`, `y`:
//!
//! ```text
//! u -- x        u -- y
//!          =>
//! v -- y        v -- x
//! ```
//!
//! All four degrees are unchanged and every edge still joins a top node to
//! a bottom node. The exchange is skipped when either new edge already
//! exists, so no multi-edge is ever created.

use crate::errors::{FdsmError, Result};
use crate::graph::BipartiteGraph;
use crate::types::{FdsmConfig, NodeId, Partition};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a single randomization call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Successful swaps asked for
    pub requested: usize,
    /// Successful swaps carried out
    pub performed: usize,
    /// Iterations spent, including rejected picks
    pub tries: usize,
}

impl SwapOutcome {
    /// True when the retry budget ran out before `requested` swaps
    pub fn is_exhausted(&self) -> bool {
        self.performed < self.requested
    }
}

/// Performs up to `nswap` successful swaps per call, spending at most
/// `max_tries` iterations.
///
/// Every iteration counts against the budget: picking the same top node
/// twice or the same bottom neighbor twice is a spent try, just like a
/// rewiring blocked by an existing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSwapRandomizer {
    nswap: usize,
    max_tries: usize,
}

impl Default for EdgeSwapRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSwapRandomizer {
    pub fn new() -> Self {
        Self {
            nswap: 1,
            max_tries: 100,
        }
    }

    pub fn from_config(config: &FdsmConfig) -> Self {
        Self {
            nswap: config.nswap,
            max_tries: config.max_tries,
        }
    }

    pub fn with_nswap(mut self, nswap: usize) -> Self {
        self.nswap = nswap;
        self
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn nswap(&self) -> usize {
        self.nswap
    }

    pub fn max_tries(&self) -> usize {
        self.max_tries
    }

    /// Randomize `graph` in place.
    ///
    /// `top` lists the nodes swaps are anchored on. Running out of tries is
    /// not an error: the partial result is kept, a warning is logged and the
    /// shortfall is visible in the returned [`SwapOutcome`].
    ///
    /// # Errors
    ///
    /// [`FdsmError::IsolatedTopNode`] when a picked top node has no
    /// neighbors.
    pub fn randomize<R: Rng + ?Sized>(
        &self,
        graph: &mut BipartiteGraph,
        top: &[NodeId],
        rng: &mut R,
    ) -> Result<SwapOutcome> {
        let mut outcome = SwapOutcome {
            requested: self.nswap,
            ..SwapOutcome::default()
        };

        while outcome.performed < self.nswap {
            if outcome.tries >= self.max_tries {
                warn!(
                    requested = outcome.requested,
                    performed = outcome.performed,
                    max_tries = self.max_tries,
                    "maximum number of swap tries exceeded"
                );
                break;
            }
            outcome.tries += 1;

            let (Some(&u), Some(&v)) = (top.choose(rng), top.choose(rng)) else {
                continue;
            };
            if u == v {
                continue;
            }

            let x = pick_neighbor(graph, u, rng)?;
            let y = pick_neighbor(graph, v, rng)?;
            if x == y {
                continue;
            }

            if !graph.has_edge(u, y) && !graph.has_edge(v, x) {
                rewire(graph, u, x, v, y);
                outcome.performed += 1;
            }
        }

        Ok(outcome)
    }
}

/// Check that every node of `top` is a top node with at least one neighbor.
pub fn ensure_swappable(graph: &BipartiteGraph, top: &[NodeId]) -> Result<()> {
    for &node in top {
        match graph.partition(node) {
            Some(Partition::Top) => {}
            Some(Partition::Bottom) => {
                return Err(FdsmError::unknown_node(format!(
                    "'{}' is a bottom node, expected a top node",
                    graph.display_label(node)
                )))
            }
            None => return Err(FdsmError::unknown_node(node.to_string())),
        }
        if graph.degree(node) == 0 {
            return Err(FdsmError::isolated_top_node(graph.display_label(node)));
        }
    }
    Ok(())
}

fn pick_neighbor<R: Rng + ?Sized>(
    graph: &BipartiteGraph,
    node: NodeId,
    rng: &mut R,
) -> Result<NodeId> {
    graph
        .neighbors(node)
        .choose(rng)
        .copied()
        .ok_or_else(|| FdsmError::isolated_top_node(graph.display_label(node)))
}

/// Exchange the bottom endpoints of `u -- x` and `v -- y`.
fn rewire(graph: &mut BipartiteGraph, u: NodeId, x: NodeId, v: NodeId, y: NodeId) {
    let added = graph.link(u, y) & graph.link(v, x);
    let removed = graph.unlink(u, x) & graph.unlink(v, y);
    debug_assert!(added && removed, "swap must add and remove exactly two edges");
}
