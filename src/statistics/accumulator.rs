//! Per-region accumulation
//!
//! Each worker owns a [`RegionAccumulator`] and produces an
//! [`AccumulatorState`] for its region without touching shared state.
//! Components of all selected pixels are pooled into one flat statistic.

use super::compensated::CompensatedSum;
use super::predicate::SamplePredicate;
use crate::image::PixelValue;
use ndarray::ArrayView1;

/// Partial or global reduction state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorState<T> {
    pub count: u64,
    pub sum: CompensatedSum,
    pub sum_of_squares: CompensatedSum,
    pub min: T,
    pub max: T,
}

impl<T: PixelValue> AccumulatorState<T> {
    /// Identity of [`AccumulatorState::combine`]
    ///
    /// `min` starts at the type maximum and `max` at the type minimum, so
    /// both are left untouched by an empty region.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            count: 0,
            sum: CompensatedSum::zero(),
            sum_of_squares: CompensatedSum::zero(),
            min: T::MAX,
            max: T::NONPOSITIVE_MIN,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one selected sample
    #[inline]
    pub fn push(&mut self, value: T) {
        self.min = lesser(self.min, value);
        self.max = greater(self.max, value);
        let real = value.to_real();
        self.sum.add(real);
        self.sum_of_squares.add(real * real);
        self.count += 1;
    }

    /// Fold another state into this one
    pub fn combine(&mut self, other: &Self) {
        self.count += other.count;
        self.sum = self.sum.combine(other.sum);
        self.sum_of_squares = self.sum_of_squares.combine(other.sum_of_squares);
        self.min = lesser(other.min, self.min);
        self.max = greater(other.max, self.max);
    }
}

impl<T: PixelValue> Default for AccumulatorState<T> {
    fn default() -> Self {
        Self::identity()
    }
}

// Ordinary comparisons: a NaN candidate never replaces the current extreme.
#[inline]
fn lesser<T: PixelValue>(current: T, candidate: T) -> T {
    if candidate < current {
        candidate
    } else {
        current
    }
}

#[inline]
fn greater<T: PixelValue>(current: T, candidate: T) -> T {
    if current < candidate {
        candidate
    } else {
        current
    }
}

/// Single-threaded accumulator for one region
#[derive(Debug, Clone, Copy)]
pub struct RegionAccumulator<'m> {
    predicate: SamplePredicate<'m>,
}

impl<'m> RegionAccumulator<'m> {
    #[must_use]
    pub const fn new(predicate: SamplePredicate<'m>) -> Self {
        Self { predicate }
    }

    /// Consume a region's `(location, pixel)` sequence into a partial state
    pub fn accumulate<'a, T, I>(&self, pixels: I) -> AccumulatorState<T>
    where
        T: PixelValue,
        I: IntoIterator<Item = (usize, ArrayView1<'a, T>)>,
    {
        let mut state = AccumulatorState::identity();
        for (location, pixel) in pixels {
            if !self.predicate.include_location(location) {
                continue;
            }
            for &value in &pixel {
                if self.predicate.include_component(value) {
                    state.push(value);
                }
            }
        }
        state
    }
}
