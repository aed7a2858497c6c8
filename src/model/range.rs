//! Closed one-dimensional ranges.

use serde::{Deserialize, Serialize};

/// A closed range `[lo, hi]` along a single axis.
///
/// Construction does not enforce `lo <= hi`; validation reports malformed
/// ranges instead of refusing to represent them.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisRange {
    pub lo: f64,
    pub hi: f64,
}

impl AxisRange {
    /// The full normalized frame extent `[0, 1]`.
    pub const FRAME: AxisRange = AxisRange { lo: 0.0, hi: 1.0 };

    #[inline]
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Returns `hi - lo`. Negative for malformed ranges.
    #[inline]
    pub fn length(&self) -> f64 {
        self.hi - self.lo
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.lo <= self.hi
    }

    /// Smallest range containing both `self` and `other`.
    #[inline]
    pub fn span(&self, other: &AxisRange) -> AxisRange {
        AxisRange::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    /// Intersection, or `None` when the ranges are disjoint.
    ///
    /// Touching ranges intersect in a single point.
    pub fn intersection(&self, other: &AxisRange) -> Option<AxisRange> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        (lo <= hi).then_some(AxisRange::new(lo, hi))
    }

    /// Returns true if `value` lies in `[lo, hi]`.
    #[inline]
    pub fn contains_value(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Grows the range by `amount` on both sides.
    #[inline]
    pub fn dilate(&self, amount: f64) -> AxisRange {
        AxisRange::new(self.lo - amount, self.hi + amount)
    }

    #[inline]
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }
}

impl std::fmt::Debug for AxisRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

impl From<(f64, f64)> for AxisRange {
    fn from((lo, hi): (f64, f64)) -> Self {
        AxisRange::new(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_takes_min_lo_and_max_hi() {
        let a = AxisRange::new(0.0, 1.0);
        let b = AxisRange::new(0.5, 1.5);
        assert_eq!(a.span(&b), AxisRange::new(0.0, 1.5));
        assert_eq!(b.span(&a), AxisRange::new(0.0, 1.5));
    }

    #[test]
    fn intersection_of_touching_ranges_is_a_point() {
        let a = AxisRange::new(0.0, 1.0);
        let b = AxisRange::new(1.0, 2.0);
        assert_eq!(a.intersection(&b), Some(AxisRange::new(1.0, 1.0)));
        assert_eq!(a.intersection(&AxisRange::new(1.5, 2.0)), None);
    }

    #[test]
    fn ordering_and_length() {
        let r = AxisRange::new(2.0, 1.0);
        assert!(!r.is_ordered());
        assert_eq!(r.length(), -1.0);
        assert!(AxisRange::new(1.0, 1.0).is_ordered());
    }
}
