//! Ready-made merge operations for joins, coalescing and grouping.
//!
//! Joins take a merge op `FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>`
//! and coalescing takes a payload merge `FnMut(&P, &P) -> P`. The functions
//! here cover the common cases so queries rarely need a hand-written
//! closure.
//!
//! ```
//! use stalgebra::merge;
//! use stalgebra::model::{Bounds, Interval};
//! use stalgebra::predicate::overlaps_3d;
//! use stalgebra::set::IntervalSet;
//!
//! let people = IntervalSet::new(vec![Interval::new(Bounds::temporal(0.0, 2.0), "person")]);
//! let cars = IntervalSet::new(vec![Interval::new(Bounds::temporal(1.0, 3.0), "car")]);
//! let pred = overlaps_3d();
//! let pairs = people.join(&cars, |a, b| pred.test(a, b), merge::span_pair, 0.0);
//! assert_eq!(pairs.intervals()[0].payload, ("person", "car"));
//! assert_eq!(pairs.intervals()[0].t2(), 3.0);
//! ```

use crate::model::{Detection, Interval};
use crate::set::IntervalSet;

/// Spanning box, keeping the left payload.
pub fn span_first<P: Clone, Q>(a: &Interval<P>, b: &Interval<Q>) -> Interval<P> {
    a.span_merge(b, |p, _| p.clone())
}

/// Spanning box, keeping the right payload.
pub fn span_second<P, Q: Clone>(a: &Interval<P>, b: &Interval<Q>) -> Interval<Q> {
    a.span_merge(b, |_, q| q.clone())
}

/// Spanning box, pairing both payloads.
pub fn span_pair<P: Clone, Q: Clone>(a: &Interval<P>, b: &Interval<Q>) -> Interval<(P, Q)> {
    a.span_merge(b, |p, q| (p.clone(), q.clone()))
}

/// Spanning box with payloads combined by `f`.
pub fn span_with<P, Q, R, F>(mut f: F) -> impl FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>
where
    F: FnMut(&P, &Q) -> R,
{
    move |a: &Interval<P>, b: &Interval<Q>| a.span_merge(b, &mut f)
}

/// Left interval unchanged; the usual merge for semi-join style queries.
pub fn keep_first<P: Clone, Q>(a: &Interval<P>, _b: &Interval<Q>) -> Interval<P> {
    a.clone()
}

/// Time intersection with spanned space, pairing payloads.
///
/// Returns `None` for pairs disjoint in time, so it is meant for
/// [`IntervalSet::flat_join`].
pub fn overlap_time_pair<P: Clone, Q: Clone>(
    a: &Interval<P>,
    b: &Interval<Q>,
) -> Option<Interval<(P, Q)>> {
    a.overlap_time_span_space(b, |p, q| (p.clone(), q.clone()))
}

/// Time intersection with spanned space, keeping the left payload.
pub fn overlap_time_first<P: Clone, Q>(a: &Interval<P>, b: &Interval<Q>) -> Option<Interval<P>> {
    a.overlap_time_span_space(b, |p, _| p.clone())
}

/// Payload merge for [`IntervalSet::coalesce`] that keeps the earlier one.
pub fn first_payload<P: Clone>(a: &P, _b: &P) -> P {
    a.clone()
}

/// Payload merge for [`IntervalSet::coalesce`] that keeps the later one.
pub fn last_payload<P: Clone>(_a: &P, b: &P) -> P {
    b.clone()
}

/// Payload merge for detections; see [`Detection::combine`].
pub fn combine_detections(a: &Detection, b: &Detection) -> Detection {
    a.combine(b)
}

/// Group merge that spans a whole bucket into one interval carrying the
/// bucket's size.
///
/// Returns `None` for an empty bucket.
pub fn span_count<P>(set: &IntervalSet<P>) -> Option<Interval<usize>> {
    let bounds = set.bounding_box()?;
    Some(Interval::new(bounds, set.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bounds;

    fn iv<P>(t1: f64, t2: f64, x1: f64, x2: f64, p: P) -> Interval<P> {
        Interval::new(Bounds::new(t1, t2, x1, x2, 0.0, 1.0), p)
    }

    #[test]
    fn span_helpers_pick_payloads() {
        let a = iv(0.0, 2.0, 0.1, 0.2, "a");
        let b = iv(1.0, 3.0, 0.5, 0.6, 7);
        let first = span_first(&a, &b);
        assert_eq!((first.t1(), first.t2(), first.x1(), first.x2()), (0.0, 3.0, 0.1, 0.6));
        assert_eq!(first.payload, "a");
        assert_eq!(span_second(&a, &b).payload, 7);
        assert_eq!(span_pair(&a, &b).payload, ("a", 7));

        let mut concat = span_with(|p: &&str, q: &i32| format!("{p}{q}"));
        assert_eq!(concat(&a, &b).payload, "a7");
    }

    #[test]
    fn overlap_time_intersects_time_only() {
        let a = iv(0.0, 2.0, 0.1, 0.2, 1);
        let b = iv(1.0, 3.0, 0.5, 0.6, 2);
        let out = overlap_time_pair(&a, &b).unwrap();
        assert_eq!(out.bounds.t.as_tuple(), (1.0, 2.0));
        assert_eq!(out.bounds.x.as_tuple(), (0.1, 0.6));
        assert_eq!(out.payload, (1, 2));

        let far = iv(5.0, 6.0, 0.0, 1.0, 3);
        assert!(overlap_time_first(&a, &far).is_none());
    }

    #[test]
    fn span_count_covers_bucket() {
        let set = IntervalSet::new(vec![iv(0.0, 1.0, 0.0, 0.5, ()), iv(3.0, 4.0, 0.2, 0.9, ())]);
        let out = span_count(&set).unwrap();
        assert_eq!(out.payload, 2);
        assert_eq!(out.bounds.t.as_tuple(), (0.0, 4.0));
        assert_eq!(out.bounds.x.as_tuple(), (0.0, 0.9));
        assert!(span_count(&IntervalSet::<()>::empty()).is_none());
    }

    #[test]
    fn detection_combine_is_exposed() {
        let a = Detection::new("car").with_score(0.4);
        let b = Detection::new("car").with_score(0.9);
        assert_eq!(combine_detections(&a, &b).score, Some(0.9));
        assert_eq!(first_payload(&1, &2), 1);
        assert_eq!(last_payload(&1, &2), 2);
    }
}
