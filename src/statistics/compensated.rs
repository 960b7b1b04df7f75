//! Compensated (Neumaier) running sum
//!
//! Naive summation over `n` terms accumulates rounding error that grows
//! with `n`. The Neumaier variant of Kahan summation keeps a separate
//! compensation term holding the low-order bits lost by each addition,
//! including the case where the addend is larger than the running total.
//!
//! Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
//! zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.

/// Running sum with a rounding-error compensation term
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    /// Empty sum
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// Add one term
    #[inline]
    pub fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    /// Best estimate of the total
    ///
    /// Once the running sum is infinite or NaN the compensation term is
    /// meaningless (`inf - inf`), so the raw sum is returned as is.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.sum.is_finite() {
            self.sum + self.compensation
        } else {
            self.sum
        }
    }

    /// Merge two independent running sums
    ///
    /// The other sum's compensation is carried over rather than folded into
    /// its rounded total first.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.add(other.sum);
        self.compensation += other.compensation;
        self
    }
}

impl std::ops::AddAssign<f64> for CompensatedSum {
    fn add_assign(&mut self, value: f64) {
        self.add(value);
    }
}

impl std::iter::FromIterator<f64> for CompensatedSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = Self::zero();
        for value in iter {
            sum.add(value);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_small_terms() {
        // 1 + 1e100 + 1 - 1e100 is 2; naive summation gives 0.
        let values = [1.0, 1e100, 1.0, -1e100];
        let naive: f64 = values.iter().sum();
        assert_eq!(naive, 0.0);

        let sum: CompensatedSum = values.into_iter().collect();
        assert_eq!(sum.value(), 2.0);
    }

    #[test]
    fn test_error_does_not_grow_with_length() {
        let mut sum = CompensatedSum::zero();
        let mut naive = 0.0_f64;
        for _ in 0..10_000_000 {
            sum += 0.1;
            naive += 0.1;
        }
        let exact = 1_000_000.0;
        assert!((sum.value() - exact).abs() < 1e-9);
        assert!((naive - exact).abs() > (sum.value() - exact).abs());
    }

    #[test]
    fn test_combine_keeps_compensation() {
        let left: CompensatedSum = [1e16, 1.0, 1.0].into_iter().collect();
        let right: CompensatedSum = [1.0, 1.0, -1e16].into_iter().collect();
        assert_eq!(left.combine(right).value(), 4.0);
        assert_eq!(right.combine(left).value(), 4.0);
        assert_eq!(CompensatedSum::zero().combine(left), left);
    }

    #[test]
    fn test_infinite_terms_stay_infinite() {
        let sum: CompensatedSum = [1.0, f64::INFINITY, 3.0].into_iter().collect();
        assert_eq!(sum.value(), f64::INFINITY);

        let negative: CompensatedSum = [f64::NEG_INFINITY, 2.0].into_iter().collect();
        assert_eq!(negative.value(), f64::NEG_INFINITY);

        // Overflow of the running total behaves like an infinite term.
        let overflow: CompensatedSum = [f64::MAX, f64::MAX, 1.0].into_iter().collect();
        assert_eq!(overflow.value(), f64::INFINITY);

        let finite: CompensatedSum = [1.0, 2.0].into_iter().collect();
        assert_eq!(finite.combine(sum).value(), f64::INFINITY);
        assert_eq!(sum.combine(finite).value(), f64::INFINITY);

        let mixed: CompensatedSum = [f64::INFINITY, f64::NEG_INFINITY].into_iter().collect();
        assert!(mixed.value().is_nan());
    }
}
