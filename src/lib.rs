//! masked_stats: parallel single-pass statistics over masked images
//!
//! Computes count, minimum, maximum, sum, sum of squares, mean, variance and
//! standard deviation over the selected scalar samples of an n-dimensional,
//! possibly multi-component image, in one pass, with the work split across
//! workers that each reduce a disjoint region.
//!
//! ## Key Features
//!
//! - **Sample Selection**: Optional mask (value `1` selects a location) and NaN exclusion
//! - **Numerical Stability**: Compensated summation for sums and sums of squares
//! - **Parallel Processing**: Thread-local accumulation with one locked merge per region
//! - **NetCDF Support**: Read images and masks from NetCDF variables, write results back
//!
//! ## Module Organization
//!
//! - [`image`]: Image, mask and region model
//! - [`statistics`]: The reduction core and pass controller
//! - [`parallel`]: Parallel processing configuration and region dispatch
//! - [`netcdf_io`]: NetCDF loading and result writing
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Examples
//!
//! ```rust
//! use masked_stats::prelude::*;
//! use ndarray::arr1;
//!
//! let image = Image::scalar(arr1(&[1.0_f64, 2.0, 3.0, 4.0]).into_dyn()).unwrap();
//! let mut controller = ReductionController::new();
//! let result = compute_statistics(&mut controller, &image, &ParallelConfig::default()).unwrap();
//!
//! assert_eq!(result.count(), 4);
//! assert_eq!(result.mean(), 2.5);
//! ```
//!
//! A pass that selects no samples is not an error: it reports `count == 0`
//! and non-finite mean and variance.

// Core modules
pub mod errors;
pub mod image;
pub mod netcdf_io;
pub mod parallel;
pub mod statistics;

// Direct re-exports for the public API
pub use errors::*;
pub use image::*;
pub use parallel::*;
pub use statistics::*;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::errors::{MaskedStatsError, Result};
    pub use crate::image::{Image, Mask, PixelValue, Region};
    pub use crate::parallel::{compute_statistics, ParallelConfig};
    pub use crate::statistics::{AccumulatorState, ReductionController, StatisticsResult};
}
