//! Bipartite graph storage and its weighted projection.

pub mod bipartite;
pub mod projection;

pub use bipartite::BipartiteGraph;
pub use projection::{co_occurrence, WeightedProjection};
