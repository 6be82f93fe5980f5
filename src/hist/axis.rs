//! Uniform binning for one histogram axis.

use serde::{Deserialize, Serialize};

use crate::domain::Observable;

/// A uniformly binned axis over `[lower, upper)`.
///
/// Values outside the range are dropped at fill time, so histogram integrals
/// count in-range entries only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinAxis {
    lower: f64,
    upper: f64,
    bins: usize,
}

impl BinAxis {
    pub fn new(lower: f64, upper: f64, bins: usize) -> Self {
        debug_assert!(bins > 0, "axis must have at least one bin");
        debug_assert!(upper > lower, "axis upper bound must exceed lower bound");
        Self { lower, upper, bins }
    }

    pub fn from_observable(observable: &Observable) -> Self {
        Self::new(observable.lower, observable.upper, observable.bins)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Width of a single bin.
    pub fn width(&self) -> f64 {
        (self.upper - self.lower) / self.bins as f64
    }

    /// Bin index for a value, or `None` for under/overflow and non-finite
    /// input. The upper edge belongs to the last bin.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.lower || value > self.upper {
            return None;
        }
        let u = (value - self.lower) / (self.upper - self.lower);
        let idx = (u * self.bins as f64) as usize;
        Some(idx.min(self.bins - 1))
    }

    /// Center of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.lower + (i as f64 + 0.5) * self.width()
    }

    /// Lower edge of bin `i` (`i == bins` gives the axis upper bound).
    pub fn edge(&self, i: usize) -> f64 {
        self.lower + i as f64 * self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_maps_values_into_bins() {
        let axis = BinAxis::new(0.0, 10.0, 10);
        assert_eq!(axis.index_of(0.0), Some(0));
        assert_eq!(axis.index_of(0.5), Some(0));
        assert_eq!(axis.index_of(9.99), Some(9));
        // Upper edge belongs to the last bin.
        assert_eq!(axis.index_of(10.0), Some(9));
    }

    #[test]
    fn index_of_drops_out_of_range_and_non_finite() {
        let axis = BinAxis::new(0.0, 10.0, 10);
        assert_eq!(axis.index_of(-0.001), None);
        assert_eq!(axis.index_of(10.001), None);
        assert_eq!(axis.index_of(f64::NAN), None);
        assert_eq!(axis.index_of(f64::INFINITY), None);
    }

    #[test]
    fn width_and_edges() {
        let axis = BinAxis::new(-1.0, 1.0, 4);
        assert!((axis.width() - 0.5).abs() < 1e-12);
        assert!((axis.edge(0) + 1.0).abs() < 1e-12);
        assert!((axis.edge(4) - 1.0).abs() < 1e-12);
        assert!((axis.center(1) + 0.25).abs() < 1e-12);
    }
}
