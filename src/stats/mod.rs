//! Null distribution statistics
//!
//! - [`accumulator`]: per-pair running sums across samples
//! - [`zscore`]: mean, standard deviation, z-score and ranking
//! - [`raw_log`]: optional dump of every recorded count

pub mod accumulator;
pub mod raw_log;
pub mod zscore;

pub use accumulator::{CooccurrenceAccumulator, PairStats};
pub use raw_log::RawSampleLog;
pub use zscore::{PairSummary, ZScoreEngine};
