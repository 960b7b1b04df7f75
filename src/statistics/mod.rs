//! Single-pass masked image statistics
//!
//! This module computes count, minimum, maximum, sum, sum of squares, mean,
//! variance and sigma over the selected samples of an image.
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`predicate`]: Mask and NaN sample selection
//! - [`compensated`]: Compensated summation primitive
//! - [`accumulator`]: Thread-local per-region accumulation
//! - [`merger`]: Lock-guarded merge into the pass-global state
//! - [`finalize`]: Mean, variance and sigma from merged totals
//! - [`controller`]: Pass lifecycle exposed to the host

pub mod accumulator;
pub mod compensated;
pub mod controller;
pub mod finalize;
pub mod merger;
pub mod predicate;

// Re-export the main types and functions for convenience
pub use accumulator::{AccumulatorState, RegionAccumulator};
pub use compensated::CompensatedSum;
pub use controller::{PassState, ReductionController};
pub use finalize::{finalize, StatisticsResult};
pub use merger::Merger;
pub use predicate::SamplePredicate;
