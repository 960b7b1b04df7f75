//! Sample selection policy

use crate::image::{Mask, PixelValue};

/// Decides which scalar samples take part in a reduction
///
/// The mask is tested once per pixel location; the NaN test runs per
/// component, so under `remove_na` a vector pixel may contribute only some
/// of its components.
#[derive(Debug, Clone, Copy)]
pub struct SamplePredicate<'m> {
    mask: Option<&'m Mask>,
    remove_na: bool,
}

impl<'m> SamplePredicate<'m> {
    #[must_use]
    pub const fn new(mask: Option<&'m Mask>, remove_na: bool) -> Self {
        Self { mask, remove_na }
    }

    /// Predicate that accepts every sample
    #[must_use]
    pub const fn accept_all() -> Self {
        Self::new(None, false)
    }

    /// Whether the pixel at `location` passes the mask gate
    #[inline]
    #[must_use]
    pub fn include_location(&self, location: usize) -> bool {
        self.mask.map_or(true, |mask| mask.value_at(location) == 1)
    }

    /// Whether one component of an already selected pixel is kept
    #[inline]
    #[must_use]
    pub fn include_component<T: PixelValue>(&self, value: T) -> bool {
        let real = value.to_real();
        #[allow(clippy::eq_op)]
        let is_number = real == real;
        !self.remove_na || is_number
    }

    /// Combined mask and NaN test for one sample
    #[must_use]
    pub fn include<T: PixelValue>(&self, location: usize, value: T) -> bool {
        self.include_location(location) && self.include_component(value)
    }
}
