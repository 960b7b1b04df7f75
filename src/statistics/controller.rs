//! Pass orchestration: reset, per-region accumulate and merge, finalize
//!
//! The controller never spawns threads. The host splits the image into
//! regions and calls [`ReductionController::accumulate_region`] followed by
//! [`ReductionController::merge_partial`] once per region, from as many
//! workers as it likes, then calls [`ReductionController::finalize_result`]
//! once every region has been merged.

use super::accumulator::{AccumulatorState, RegionAccumulator};
use super::finalize::{finalize, StatisticsResult};
use super::merger::Merger;
use super::predicate::SamplePredicate;
use crate::errors::{MaskedStatsError, Result};
use crate::image::{Image, Mask, PixelValue, Region};
use tracing::{info, warn};

/// Lifecycle of a reduction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// No pass has started
    Idle,
    /// Global state reset, regions may be accumulated and merged
    Accumulating,
    /// Result available; the next pass must reset first
    Finalized,
}

impl PassState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Accumulating => "Accumulating",
            Self::Finalized => "Finalized",
        }
    }
}

/// Masked statistics over one image, one pass at a time
#[derive(Debug)]
pub struct ReductionController<T> {
    mask: Option<Mask>,
    remove_na: bool,
    state: PassState,
    /// Spatial shape of the image the current pass was reset for
    pass_shape: Option<Vec<usize>>,
    merger: Merger<T>,
    result: Option<StatisticsResult<T>>,
}

impl<T: PixelValue> ReductionController<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mask: None,
            remove_na: false,
            state: PassState::Idle,
            pass_shape: None,
            merger: Merger::new(),
            result: None,
        }
    }

    fn ensure_not_accumulating(&self) -> Result<()> {
        if self.state == PassState::Accumulating {
            return Err(MaskedStatsError::PassInProgress);
        }
        Ok(())
    }

    fn expect_state(&self, expected: PassState) -> Result<()> {
        if self.state != expected {
            return Err(MaskedStatsError::InvalidPassState {
                expected: expected.as_str(),
                found: self.state.as_str(),
            });
        }
        Ok(())
    }

    /// Set or clear the inclusion mask
    ///
    /// # Errors
    ///
    /// Returns [`MaskedStatsError::PassInProgress`] while a pass is accumulating.
    pub fn set_mask(&mut self, mask: Option<Mask>) -> Result<()> {
        self.ensure_not_accumulating()?;
        self.mask = mask;
        Ok(())
    }

    /// Exclude NaN samples from the statistics
    ///
    /// # Errors
    ///
    /// Returns [`MaskedStatsError::PassInProgress`] while a pass is accumulating.
    pub fn set_remove_na(&mut self, remove_na: bool) -> Result<()> {
        self.ensure_not_accumulating()?;
        self.remove_na = remove_na;
        Ok(())
    }

    #[must_use]
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    #[must_use]
    pub const fn remove_na(&self) -> bool {
        self.remove_na
    }

    #[must_use]
    pub const fn state(&self) -> PassState {
        self.state
    }

    /// Result of the last finalized pass
    #[must_use]
    pub fn result(&self) -> Option<&StatisticsResult<T>> {
        self.result.as_ref()
    }

    /// Start a pass over `image`
    ///
    /// Allowed from any state, so an abandoned pass can be restarted.
    ///
    /// # Errors
    ///
    /// Returns [`MaskedStatsError::GeometryMismatch`] if a mask is set and its
    /// shape differs from the image's spatial shape.
    pub fn reset_accumulators(&mut self, image: &Image<T>) -> Result<()> {
        if let Some(mask) = &self.mask {
            if mask.shape() != image.shape() {
                return Err(MaskedStatsError::GeometryMismatch {
                    image: image.shape().to_vec(),
                    mask: mask.shape().to_vec(),
                });
            }
        }

        self.merger.reset();
        self.result = None;
        self.pass_shape = Some(image.shape().to_vec());
        self.state = PassState::Accumulating;
        info!(
            pixels = image.pixel_count(),
            components = image.components(),
            masked = self.mask.is_some(),
            remove_na = self.remove_na,
            "starting statistics pass"
        );
        Ok(())
    }

    /// Accumulate one region into a thread-local partial state
    ///
    /// Safe to call concurrently for disjoint regions.
    ///
    /// # Errors
    ///
    /// Returns an error if no pass is accumulating, if `image` is not the
    /// image the pass was reset for, or if `region` lies outside it.
    pub fn accumulate_region(
        &self,
        image: &Image<T>,
        region: &Region,
    ) -> Result<AccumulatorState<T>> {
        self.expect_state(PassState::Accumulating)?;
        if self.pass_shape.as_deref() != Some(image.shape()) {
            return Err(MaskedStatsError::invalid_image(
                "image geometry changed after the pass was reset",
            ));
        }
        if !image.largest_region().contains(region) {
            return Err(MaskedStatsError::invalid_region(format!(
                "region start {:?} size {:?} is outside image {:?}",
                region.start(),
                region.size(),
                image.shape()
            )));
        }

        let predicate = SamplePredicate::new(self.mask.as_ref(), self.remove_na);
        Ok(RegionAccumulator::new(predicate).accumulate(image.scan(region)))
    }

    /// Merge a region's partial state into the pass-global state
    ///
    /// # Errors
    ///
    /// Returns an error if no pass is accumulating.
    pub fn merge_partial(&self, partial: &AccumulatorState<T>) -> Result<()> {
        self.expect_state(PassState::Accumulating)?;
        self.merger.merge(partial);
        Ok(())
    }

    /// Finish the pass and derive the final statistics
    ///
    /// # Errors
    ///
    /// Returns an error if no pass is accumulating.
    pub fn finalize_result(&mut self) -> Result<StatisticsResult<T>> {
        self.expect_state(PassState::Accumulating)?;
        let result = finalize(&self.merger.snapshot());
        if !result.has_finite_moments() {
            warn!(
                count = result.count(),
                "fewer than two samples selected; mean and variance are not finite"
            );
        }
        info!(count = result.count(), mean = result.mean(), "statistics pass finished");

        self.state = PassState::Finalized;
        self.pass_shape = None;
        self.result = Some(result);
        Ok(result)
    }
}

impl<T: PixelValue> Default for ReductionController<T> {
    fn default() -> Self {
        Self::new()
    }
}
