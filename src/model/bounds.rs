//! Axis-aligned spatiotemporal boxes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::axis::Axis;
use super::range::AxisRange;
use crate::error::StalgebraError;

/// An axis-aligned box over time (`t`) and two normalized spatial axes
/// (`x`, `y`).
///
/// Bounds are plain `Copy` values. [`Bounds::new`] does NOT check that
/// `lo <= hi` on each axis, so that loaders can represent bad input and let
/// validation report it; use [`Bounds::try_new`] to reject it up front.
///
/// Equality agrees with [`Bounds::total_cmp`]: NaN equals itself and
/// `-0.0` differs from `0.0`.
#[derive(Clone, Copy)]
pub struct Bounds {
    pub t: AxisRange,
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Bounds {
    /// Creates bounds from explicit coordinates without validation.
    #[inline]
    pub fn new(t1: f64, t2: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            t: AxisRange::new(t1, t2),
            x: AxisRange::new(x1, x2),
            y: AxisRange::new(y1, y2),
        }
    }

    /// Creates bounds, failing with [`StalgebraError::InvariantViolation`]
    /// on the first axis where `lo > hi` (or either end is NaN).
    pub fn try_new(
        t1: f64,
        t2: f64,
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
    ) -> Result<Self, StalgebraError> {
        let bounds = Self::new(t1, t2, x1, x2, y1, y2);
        bounds.validate()?;
        Ok(bounds)
    }

    #[inline]
    pub fn from_ranges(t: AxisRange, x: AxisRange, y: AxisRange) -> Self {
        Self { t, x, y }
    }

    /// Time-only bounds covering the whole frame spatially.
    #[inline]
    pub fn temporal(t1: f64, t2: f64) -> Self {
        Self::from_ranges(AxisRange::new(t1, t2), AxisRange::FRAME, AxisRange::FRAME)
    }

    #[inline]
    pub fn t1(&self) -> f64 {
        self.t.lo
    }

    #[inline]
    pub fn t2(&self) -> f64 {
        self.t.hi
    }

    #[inline]
    pub fn x1(&self) -> f64 {
        self.x.lo
    }

    #[inline]
    pub fn x2(&self) -> f64 {
        self.x.hi
    }

    #[inline]
    pub fn y1(&self) -> f64 {
        self.y.lo
    }

    #[inline]
    pub fn y2(&self) -> f64 {
        self.y.hi
    }

    /// Returns the range along a declared axis.
    #[inline]
    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::T => self.t,
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Looks up an axis by name, returning `(lo, hi)`.
    pub fn axis(&self, name: &str) -> Result<(f64, f64), StalgebraError> {
        let axis: Axis = name.parse()?;
        Ok(self.range(axis).as_tuple())
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn span(&self, other: &Bounds) -> Bounds {
        Bounds::from_ranges(
            self.t.span(&other.t),
            self.x.span(&other.x),
            self.y.span(&other.y),
        )
    }

    /// Returns true if `other` lies within `self` on every axis.
    pub fn encloses(&self, other: &Bounds) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let outer = self.range(axis);
            let inner = other.range(axis);
            outer.lo <= inner.lo && inner.hi <= outer.hi
        })
    }

    /// Duration along `t`.
    #[inline]
    pub fn length(&self) -> f64 {
        self.t.length()
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x.length()
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y.length()
    }

    /// Spatial area (`width * height`).
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.t.is_ordered() && self.x.is_ordered() && self.y.is_ordered()
    }

    /// Checks the `lo <= hi` invariant on every axis.
    pub fn validate(&self) -> Result<(), StalgebraError> {
        for axis in Axis::ALL {
            let range = self.range(axis);
            if !range.is_ordered() {
                return Err(StalgebraError::InvariantViolation {
                    axis,
                    lo: range.lo,
                    hi: range.hi,
                });
            }
        }
        Ok(())
    }

    /// Same time range, spatial extent widened to the whole frame.
    #[inline]
    pub fn expand_to_frame(&self) -> Bounds {
        Bounds::temporal(self.t.lo, self.t.hi)
    }

    /// Replaces the time range, keeping the spatial extent.
    #[inline]
    pub fn with_time(&self, t1: f64, t2: f64) -> Bounds {
        Bounds::from_ranges(AxisRange::new(t1, t2), self.x, self.y)
    }

    /// Grows the time range by `window` on both sides.
    #[inline]
    pub fn dilate(&self, window: f64) -> Bounds {
        Bounds::from_ranges(self.t.dilate(window), self.x, self.y)
    }

    /// The default ordering: lexicographic over `t1, t2, x1, x2, y1, y2`
    /// using IEEE total order, so NaN coordinates still sort
    /// deterministically.
    pub fn total_cmp(&self, other: &Bounds) -> Ordering {
        self.t
            .lo
            .total_cmp(&other.t.lo)
            .then_with(|| self.t.hi.total_cmp(&other.t.hi))
            .then_with(|| self.x.lo.total_cmp(&other.x.lo))
            .then_with(|| self.x.hi.total_cmp(&other.x.hi))
            .then_with(|| self.y.lo.total_cmp(&other.y.lo))
            .then_with(|| self.y.hi.total_cmp(&other.y.hi))
    }
}

impl PartialEq for Bounds {
    fn eq(&self, other: &Bounds) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Bounds {}

impl std::fmt::Debug for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bounds")
            .field("t", &self.t)
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::temporal(0.0, 0.0)
    }
}

// Flat t1..y2 layout on the wire, matching the detection record shape.
impl Serialize for Bounds {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Bounds", 6)?;
        state.serialize_field("t1", &self.t.lo)?;
        state.serialize_field("t2", &self.t.hi)?;
        state.serialize_field("x1", &self.x.lo)?;
        state.serialize_field("x2", &self.x.hi)?;
        state.serialize_field("y1", &self.y.lo)?;
        state.serialize_field("y2", &self.y.hi)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        fn frame_lo() -> f64 {
            0.0
        }
        fn frame_hi() -> f64 {
            1.0
        }

        #[derive(Deserialize)]
        struct BoundsData {
            t1: f64,
            t2: f64,
            #[serde(default = "frame_lo")]
            x1: f64,
            #[serde(default = "frame_hi")]
            x2: f64,
            #[serde(default = "frame_lo")]
            y1: f64,
            #[serde(default = "frame_hi")]
            y2: f64,
        }
        let d = BoundsData::deserialize(deserializer)?;
        Ok(Bounds::new(d.t1, d.t2, d.x1, d.x2, d.y1, d.y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interval;

    #[test]
    fn named_accessors() {
        let b = Bounds::new(0.0, 1.0, 0.1, 0.2, 0.3, 0.4);
        assert_eq!((b.t1(), b.t2()), (0.0, 1.0));
        assert_eq!((b.x1(), b.x2()), (0.1, 0.2));
        assert_eq!((b.y1(), b.y2()), (0.3, 0.4));
        assert_eq!(b.axis("x").unwrap(), (0.1, 0.2));
    }

    #[test]
    fn axis_lookup_rejects_unknown_name() {
        let b = Bounds::temporal(0.0, 1.0);
        assert!(matches!(
            b.axis("w"),
            Err(StalgebraError::UnknownAxis(ref name)) if name == "w"
        ));
    }

    #[test]
    fn try_new_reports_first_bad_axis() {
        let err = Bounds::try_new(0.0, 1.0, 0.8, 0.2, 1.0, 0.0).unwrap_err();
        match err {
            StalgebraError::InvariantViolation { axis, lo, hi } => {
                assert_eq!(axis, Axis::X);
                assert_eq!((lo, hi), (0.8, 0.2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // zero width is allowed
        assert!(Bounds::try_new(1.0, 1.0, 0.0, 0.0, 0.5, 0.5).is_ok());
    }

    #[test]
    fn span_is_tightest_enclosing_box() {
        let a = Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        let b = Bounds::new(0.0, 1.0, 0.5, 1.5, 0.0, 1.0);
        let s = a.span(&b);
        assert_eq!(s, Bounds::new(0.0, 1.0, 0.0, 1.5, 0.0, 1.0));
        assert!(s.encloses(&a) && s.encloses(&b));
    }

    #[test]
    fn total_cmp_is_lexicographic() {
        let a = Bounds::new(0.0, 2.0, 0.0, 1.0, 0.0, 1.0);
        let b = Bounds::new(0.0, 2.0, 0.1, 1.0, 0.0, 1.0);
        let c = Bounds::new(1.0, 1.5, 0.0, 0.1, 0.0, 0.1);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(b.total_cmp(&c), Ordering::Less);
        assert_eq!(a.total_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn equality_follows_total_cmp() {
        let nan = Bounds::temporal(f64::NAN, 1.0);
        assert_eq!(nan, nan);
        assert_eq!(nan.total_cmp(&nan), Ordering::Equal);

        let neg = Bounds::temporal(-0.0, 1.0);
        let pos = Bounds::temporal(0.0, 1.0);
        assert_ne!(neg, pos);
        assert_ne!(neg.total_cmp(&pos), Ordering::Equal);

        let a = Interval::new(neg, ());
        let b = Interval::new(pos, ());
        assert_eq!(a == b, a.cmp_bounds(&b) == Ordering::Equal);
    }

    #[test]
    fn serde_uses_flat_layout_with_frame_defaults() {
        let b: Bounds = serde_json::from_str(r#"{"t1": 2.0, "t2": 3.0}"#).unwrap();
        assert_eq!(b, Bounds::temporal(2.0, 3.0));

        let json = serde_json::to_value(Bounds::new(0.0, 1.0, 0.1, 0.2, 0.3, 0.4)).unwrap();
        assert_eq!(json["x2"], 0.2);
        assert_eq!(json["y1"], 0.3);
    }

    #[test]
    fn dilate_only_touches_time() {
        let b = Bounds::new(1.0, 2.0, 0.1, 0.2, 0.3, 0.4).dilate(0.5);
        assert_eq!(b, Bounds::new(0.5, 2.5, 0.1, 0.2, 0.3, 0.4));
        assert_eq!(b.expand_to_frame(), Bounds::temporal(0.5, 2.5));
    }
}
