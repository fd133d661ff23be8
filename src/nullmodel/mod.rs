//! Fixed Degree Sequence Model: randomization and sampling
//!
//! - [`swap`]: one unit of degree-preserving randomization
//! - [`sampler`]: a stream of snapshots drawn from a single evolving graph

pub mod sampler;
pub mod swap;

pub use sampler::{NullModelSampler, Snapshot};
pub use swap::{ensure_swappable, EdgeSwapRandomizer, SwapOutcome};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// RNG for a run: seeded when reproducibility is requested, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
