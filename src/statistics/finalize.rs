//! Derivation of mean, variance and sigma from merged totals

use super::accumulator::AccumulatorState;
use crate::errors::Result;
use crate::image::PixelValue;
use serde_json::{json, Value as JsonValue};
use std::fmt;

/// Final statistics of one pass
///
/// `mean`, `variance` and `sigma` are only meaningful when `count >= 2`;
/// smaller counts yield NaN rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsResult<T> {
    count: u64,
    minimum: T,
    maximum: T,
    sum: f64,
    sum_of_squares: f64,
    mean: f64,
    variance: f64,
    sigma: f64,
}

impl<T: PixelValue> StatisticsResult<T> {
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn minimum(&self) -> T {
        self.minimum
    }

    #[must_use]
    pub const fn maximum(&self) -> T {
        self.maximum
    }

    #[must_use]
    pub const fn sum(&self) -> f64 {
        self.sum
    }

    #[must_use]
    pub const fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Bessel-corrected sample variance
    #[must_use]
    pub const fn variance(&self) -> f64 {
        self.variance
    }

    /// Sample standard deviation
    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Whether mean, variance and sigma are backed by enough samples
    #[must_use]
    pub const fn has_finite_moments(&self) -> bool {
        self.count >= 2
    }

    /// JSON object with every field
    ///
    /// Non-finite values are written as `null`.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        json!({
            "count": self.count,
            "minimum": self.minimum.to_real(),
            "maximum": self.maximum.to_real(),
            "sum": self.sum,
            "sum_of_squares": self.sum_of_squares,
            "mean": self.mean,
            "variance": self.variance,
            "sigma": self.sigma,
        })
    }

    /// Pretty-printed JSON report
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_value())?)
    }
}

impl<T: PixelValue> fmt::Display for StatisticsResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Count: {}", self.count)?;
        writeln!(f, "Minimum: {}", self.minimum)?;
        writeln!(f, "Maximum: {}", self.maximum)?;
        writeln!(f, "Sum: {}", self.sum)?;
        writeln!(f, "Mean: {}", self.mean)?;
        writeln!(f, "Sigma: {}", self.sigma)?;
        writeln!(f, "Variance: {}", self.variance)?;
        write!(f, "SumOfSquares: {}", self.sum_of_squares)
    }
}

/// Compute the final statistics from a fully merged global state
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn finalize<T: PixelValue>(global: &AccumulatorState<T>) -> StatisticsResult<T> {
    let count = global.count as f64;
    let sum = global.sum.value();
    let sum_of_squares = global.sum_of_squares.value();

    let mean = sum / count;
    let variance = (sum_of_squares - sum * sum / count) / (count - 1.0);

    StatisticsResult {
        count: global.count,
        minimum: global.min,
        maximum: global.max,
        sum,
        sum_of_squares,
        mean,
        variance,
        sigma: variance.sqrt(),
    }
}
