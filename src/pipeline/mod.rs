//! End-to-end co-occurrence significance runs.
//!
//! - [`runner`]: stage orchestration, producing an [`FdsmReport`]
//! - [`observer`]: progress, cancellation and timing hooks

pub mod observer;
pub mod runner;

pub use observer::{
    NoopObserver, ProgressLogger, RunReport, SampleReport, SamplingObserver, StopFlag,
};
pub use runner::{FdsmPipeline, FdsmReport};
