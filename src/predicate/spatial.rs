//! Spatial predicates: binary box relations on `x`/`y` and unary size and
//! position filters.

use std::fmt;
use std::sync::Arc;

use super::{BoundsPredicate, Cast};
use crate::model::{Axis, Bounds, Interval};

const XY: Cast = Cast::Pair(Axis::X, Axis::Y);

/// `a` lies strictly to the left of `b`.
pub fn left_of() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.x2() < b.x1(), Cast::Axis(Axis::X))
}

pub fn right_of() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.x1() > b.x2(), Cast::Axis(Axis::X))
}

/// `a` lies strictly above `b` (smaller `y` is higher in the frame).
pub fn above() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.y2() < b.y1(), Cast::Axis(Axis::Y))
}

pub fn below() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.y1() > b.y2(), Cast::Axis(Axis::Y))
}

/// `a`'s box lies within `b`'s box.
pub fn inside() -> BoundsPredicate {
    BoundsPredicate::casted(
        |a, b| a.x1() >= b.x1() && a.x2() <= b.x2() && a.y1() >= b.y1() && a.y2() <= b.y2(),
        XY,
    )
}

/// `a`'s box encloses `b`'s box.
pub fn contains() -> BoundsPredicate {
    inside().flip()
}

pub fn same_area(epsilon: f64) -> BoundsPredicate {
    BoundsPredicate::casted(move |a, b| (a.area() - b.area()).abs() < epsilon, XY)
}

pub fn more_area() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.area() > b.area(), XY)
}

pub fn less_area() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.area() < b.area(), XY)
}

pub fn same_width(epsilon: f64) -> BoundsPredicate {
    BoundsPredicate::casted(
        move |a, b| (a.width() - b.width()).abs() < epsilon,
        Cast::Axis(Axis::X),
    )
}

pub fn more_width() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.width() > b.width(), Cast::Axis(Axis::X))
}

pub fn less_width() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.width() < b.width(), Cast::Axis(Axis::X))
}

pub fn same_height(epsilon: f64) -> BoundsPredicate {
    BoundsPredicate::casted(
        move |a, b| (a.height() - b.height()).abs() < epsilon,
        Cast::Axis(Axis::Y),
    )
}

pub fn more_height() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.height() > b.height(), Cast::Axis(Axis::Y))
}

pub fn less_height() -> BoundsPredicate {
    BoundsPredicate::casted(|a, b| a.height() < b.height(), Cast::Axis(Axis::Y))
}

type FilterFn = dyn Fn(&Bounds) -> bool + Send + Sync;

/// A unary test over one [`Bounds`], used with [`IntervalSet::filter`].
///
/// [`IntervalSet::filter`]: crate::set::IntervalSet::filter
#[derive(Clone)]
pub struct BoundsFilter(Arc<FilterFn>);

impl BoundsFilter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Bounds) -> bool + Send + Sync + 'static,
    {
        BoundsFilter(Arc::new(f))
    }

    #[inline]
    pub fn matches(&self, bounds: &Bounds) -> bool {
        (self.0)(bounds)
    }

    #[inline]
    pub fn test<P>(&self, interval: &Interval<P>) -> bool {
        self.matches(&interval.bounds)
    }

    pub fn and(self, other: BoundsFilter) -> BoundsFilter {
        BoundsFilter::new(move |b| self.matches(b) && other.matches(b))
    }

    pub fn or(self, other: BoundsFilter) -> BoundsFilter {
        BoundsFilter::new(move |b| self.matches(b) || other.matches(b))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> BoundsFilter {
        BoundsFilter::new(move |b| !self.matches(b))
    }

    /// Area within `epsilon` of `area`.
    pub fn area_exactly(area: f64, epsilon: f64) -> Self {
        BoundsFilter::new(move |b| (b.area() - area).abs() < epsilon)
    }

    pub fn area_at_least(area: f64) -> Self {
        BoundsFilter::new(move |b| b.area() >= area)
    }

    pub fn area_at_most(area: f64) -> Self {
        BoundsFilter::new(move |b| b.area() <= area)
    }

    pub fn area_between(min: f64, max: f64) -> Self {
        BoundsFilter::new(move |b| (min..=max).contains(&b.area()))
    }

    pub fn width_exactly(width: f64, epsilon: f64) -> Self {
        BoundsFilter::new(move |b| (b.width() - width).abs() < epsilon)
    }

    pub fn width_at_least(width: f64) -> Self {
        BoundsFilter::new(move |b| b.width() >= width)
    }

    pub fn width_at_most(width: f64) -> Self {
        BoundsFilter::new(move |b| b.width() <= width)
    }

    pub fn width_between(min: f64, max: f64) -> Self {
        BoundsFilter::new(move |b| (min..=max).contains(&b.width()))
    }

    pub fn height_exactly(height: f64, epsilon: f64) -> Self {
        BoundsFilter::new(move |b| (b.height() - height).abs() < epsilon)
    }

    pub fn height_at_least(height: f64) -> Self {
        BoundsFilter::new(move |b| b.height() >= height)
    }

    pub fn height_at_most(height: f64) -> Self {
        BoundsFilter::new(move |b| b.height() <= height)
    }

    pub fn height_between(min: f64, max: f64) -> Self {
        BoundsFilter::new(move |b| (min..=max).contains(&b.height()))
    }

    /// Duration along `t` of at least `length`.
    pub fn length_at_least(length: f64) -> Self {
        BoundsFilter::new(move |b| b.length() >= length)
    }

    pub fn length_at_most(length: f64) -> Self {
        BoundsFilter::new(move |b| b.length() <= length)
    }

    /// Every spatial corner within `epsilon` of the given coordinates.
    pub fn position(x1: f64, y1: f64, x2: f64, y2: f64, epsilon: f64) -> Self {
        BoundsFilter::new(move |b| {
            (b.x1() - x1).abs() < epsilon
                && (b.y1() - y1).abs() < epsilon
                && (b.x2() - x2).abs() < epsilon
                && (b.y2() - y2).abs() < epsilon
        })
    }
}

impl fmt::Debug for BoundsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundsFilter")
    }
}
