//! Parallel processing configuration and the host-side region dispatcher
//!
//! The statistics core is driven from here: the image is split into one
//! region per worker and the regions are accumulated and merged on a Rayon
//! pool.

use crate::errors::{MaskedStatsError, Result};
use crate::image::{Image, PixelValue};
use crate::statistics::{ReductionController, StatisticsResult};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    #[must_use]
    pub const fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Run `op` on a dedicated pool when a thread count is set, otherwise on
    /// the current pool
    ///
    /// # Errors
    ///
    /// Returns an error if the dedicated pool cannot be built, or whatever
    /// `op` returns.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> Result<R> + Send,
    {
        match self.num_threads {
            Some(num_threads) => ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| {
                    MaskedStatsError::ThreadPoolError(format!(
                        "Failed to build thread pool with {num_threads} threads: {e}"
                    ))
                })?
                .install(op),
            None => op(),
        }
    }

    /// Get the current number of threads being used
    #[must_use]
    pub fn current_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(rayon::current_num_threads)
    }

    /// Create a configuration that uses all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    #[must_use]
    pub const fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Create a configuration that uses the default thread pool
    #[must_use]
    pub const fn new_default() -> Self {
        Self { num_threads: None }
    }
}

/// Get information about the current parallel configuration
#[must_use]
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Print parallel processing information
    pub fn print_info(&self) {
        println!("📊 Parallel Processing Information:");
        println!("   Current threads: {}", self.current_threads);
        println!("   Available CPU cores: {}", self.available_cores);
        println!("   Available parallelism: {}", self.available_parallelism);
    }
}

/// Run a full pass over `image` with one region per worker thread
///
/// # Errors
///
/// Returns an error if the controller's mask does not match the image or
/// if the thread pool cannot be built.
pub fn compute_statistics<T: PixelValue>(
    controller: &mut ReductionController<T>,
    image: &Image<T>,
    config: &ParallelConfig,
) -> Result<StatisticsResult<T>> {
    controller.reset_accumulators(image)?;

    let shared: &ReductionController<T> = controller;
    config.install(|| {
        let regions = image.largest_region().split(rayon::current_num_threads());
        debug!(regions = regions.len(), "dispatching regions");
        regions.par_iter().try_for_each(|region| {
            let partial = shared.accumulate_region(image, region)?;
            shared.merge_partial(&partial)
        })
    })?;

    controller.finalize_result()
}

/// Run a full pass on the calling thread, split into `regions` pieces
///
/// # Errors
///
/// Returns an error if the controller's mask does not match the image.
pub fn compute_statistics_sequential<T: PixelValue>(
    controller: &mut ReductionController<T>,
    image: &Image<T>,
    regions: usize,
) -> Result<StatisticsResult<T>> {
    controller.reset_accumulators(image)?;
    for region in image.largest_region().split(regions) {
        let partial = controller.accumulate_region(image, &region)?;
        controller.merge_partial(&partial)?;
    }
    controller.finalize_result()
}
