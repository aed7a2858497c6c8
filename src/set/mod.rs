//! Sorted collections of intervals and the operations over them.
//!
//! An [`IntervalSet`] is always held in the default order (see
//! [`Bounds::total_cmp`]); every operation that may change bounds re-sorts
//! before returning. Sorting is stable, so intervals with identical bounds
//! keep the order in which they were produced.
//!
//! The binary operations live in submodules: the windowed join in
//! [`join`], temporal difference in [`minus`], single-pass merging in
//! [`coalesce`] and constraint matching in [`pattern`].

mod coalesce;
mod join;
mod minus;
mod pattern;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::mapping::IntervalSetMapping;
use crate::model::{AxisRange, Bounds, Interval};

pub use join::JoinStats;
pub use pattern::{Match, Pattern};

/// Sets larger than this use a fraction of their time extent as the
/// default join window.
pub const DEFAULT_WINDOW_THRESHOLD: usize = 1000;

/// Fraction of the time extent used as the default window for large sets.
pub const DEFAULT_WINDOW_FRACTION: f64 = 0.01;

/// An ordered, duplicate-permitting collection of intervals.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalSet<P> {
    intervals: Vec<Interval<P>>,
}

impl<P> Default for IntervalSet<P> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }
}

impl<P> IntervalSet<P> {
    /// Builds a set, sorting the intervals into the default order.
    pub fn new(mut intervals: Vec<Interval<P>>) -> Self {
        intervals.sort_by(|a, b| a.cmp_bounds(b));
        Self { intervals }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The intervals in canonical sorted order.
    #[inline]
    pub fn intervals(&self) -> &[Interval<P>] {
        &self.intervals
    }

    pub fn into_intervals(self) -> Vec<Interval<P>> {
        self.intervals
    }

    /// An owned copy of the sorted sequence.
    pub fn to_sequence(&self) -> Vec<Interval<P>>
    where
        P: Clone,
    {
        self.intervals.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval<P>> {
        self.intervals.iter()
    }

    /// Returns true if the stored sequence is non-decreasing under the
    /// default comparator.
    pub fn is_sorted(&self) -> bool {
        self.intervals
            .windows(2)
            .all(|w| w[0].cmp_bounds(&w[1]) != Ordering::Greater)
    }

    /// Keeps intervals for which `predicate` holds. Order is preserved.
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&Interval<P>) -> bool,
    {
        let intervals = self
            .intervals
            .into_iter()
            .filter(|i| predicate(i))
            .collect();
        Self { intervals }
    }

    /// Applies `f` to every interval and re-sorts.
    pub fn map<Q, F>(self, f: F) -> IntervalSet<Q>
    where
        F: FnMut(Interval<P>) -> Interval<Q>,
    {
        IntervalSet::new(self.intervals.into_iter().map(f).collect())
    }

    /// Transforms payloads only. Bounds and order are unchanged.
    pub fn map_payload<Q, F>(self, mut f: F) -> IntervalSet<Q>
    where
        F: FnMut(P) -> Q,
    {
        let intervals = self
            .intervals
            .into_iter()
            .map(|i| i.map_payload(&mut f))
            .collect();
        IntervalSet { intervals }
    }

    /// Multiset union: concatenation followed by a sort. Duplicates stay.
    pub fn union(self, other: IntervalSet<P>) -> Self {
        let mut intervals = self.intervals;
        intervals.extend(other.intervals);
        Self::new(intervals)
    }

    /// Folds over the intervals in sorted order.
    pub fn fold<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, &Interval<P>) -> A,
    {
        self.intervals.iter().fold(init, f)
    }

    /// Folds over the intervals in the order given by `cmp`.
    pub fn fold_by<A, C, F>(&self, mut cmp: C, init: A, f: F) -> A
    where
        C: FnMut(&Interval<P>, &Interval<P>) -> Ordering,
        F: FnMut(A, &Interval<P>) -> A,
    {
        let mut ordered: Vec<&Interval<P>> = self.intervals.iter().collect();
        ordered.sort_by(|a, b| cmp(a, b));
        ordered.into_iter().fold(init, f)
    }

    /// Buckets intervals by `key_fn` and folds each bucket into a single
    /// interval with `merge_op`. Buckets are visited in key order and each
    /// is handed over as a sorted set.
    pub fn group_by<K, R, KF, M>(self, mut key_fn: KF, mut merge_op: M) -> IntervalSet<R>
    where
        K: Ord,
        KF: FnMut(&Interval<P>) -> K,
        M: FnMut(&K, IntervalSet<P>) -> Interval<R>,
    {
        let mut groups: BTreeMap<K, Vec<Interval<P>>> = BTreeMap::new();
        for interval in self.intervals {
            groups.entry(key_fn(&interval)).or_default().push(interval);
        }
        let merged = groups
            .into_iter()
            .map(|(key, members)| merge_op(&key, IntervalSet { intervals: members }))
            .collect();
        IntervalSet::new(merged)
    }

    /// Splits the set into a keyed mapping, one set per distinct key.
    pub fn group_into_mapping<K, KF>(self, key_fn: KF) -> IntervalSetMapping<K, P>
    where
        K: Ord + Clone,
        KF: FnMut(&Interval<P>) -> K,
    {
        IntervalSetMapping::from_set(self, key_fn)
    }

    /// Keeps intervals whose duration lies in `[min, max]`; `max = None`
    /// leaves the upper end open.
    pub fn filter_size(self, min: f64, max: Option<f64>) -> Self {
        self.filter(|i| {
            let length = i.length();
            length >= min && max.is_none_or(|max| length <= max)
        })
    }

    /// Grows every interval by `window` on both ends of `t`.
    pub fn dilate(self, window: f64) -> Self {
        let intervals = self
            .intervals
            .into_iter()
            .map(|i| {
                let bounds = i.bounds.dilate(window);
                i.with_bounds(bounds)
            })
            .collect();
        IntervalSet::new(intervals)
    }

    /// Widens every interval to the full frame spatially.
    pub fn expand_to_frame(self) -> Self {
        self.map(Interval::expand_to_frame)
    }

    /// Sum of interval durations. Overlaps are counted twice.
    pub fn total_time(&self) -> f64 {
        self.intervals.iter().map(Interval::length).sum()
    }

    /// `[min t1, max t2]`, or `None` for an empty set.
    pub fn time_extent(&self) -> Option<AxisRange> {
        let first = self.intervals.first()?;
        let hi = self
            .intervals
            .iter()
            .map(Interval::t2)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(AxisRange::new(first.t1(), hi))
    }

    /// Join window used when none is given: the full time extent, or a
    /// hundredth of it for sets above [`DEFAULT_WINDOW_THRESHOLD`].
    pub fn default_window(&self) -> f64 {
        let Some(extent) = self.time_extent() else {
            return 0.0;
        };
        let span = extent.length().max(0.0);
        if self.len() > DEFAULT_WINDOW_THRESHOLD {
            span * DEFAULT_WINDOW_FRACTION
        } else {
            span
        }
    }

    /// The smallest box enclosing every interval.
    pub fn bounding_box(&self) -> Option<Bounds> {
        let mut iter = self.intervals.iter();
        let first = iter.next()?.bounds;
        Some(iter.fold(first, |acc, i| acc.span(&i.bounds)))
    }
}

impl<P> FromIterator<Interval<P>> for IntervalSet<P> {
    fn from_iter<I: IntoIterator<Item = Interval<P>>>(iter: I) -> Self {
        IntervalSet::new(iter.into_iter().collect())
    }
}

impl<P> IntoIterator for IntervalSet<P> {
    type Item = Interval<P>;
    type IntoIter = std::vec::IntoIter<Interval<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}

impl<'a, P> IntoIterator for &'a IntervalSet<P> {
    type Item = &'a Interval<P>;
    type IntoIter = std::slice::Iter<'a, Interval<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(t1: f64, t2: f64, p: &'static str) -> Interval<&'static str> {
        Interval::new(Bounds::temporal(t1, t2), p)
    }

    #[test]
    fn construction_sorts_stably() {
        let set = IntervalSet::new(vec![
            iv(2.0, 3.0, "c"),
            iv(0.0, 1.0, "a"),
            iv(0.0, 1.0, "b"),
            iv(0.0, 0.5, "z"),
        ]);
        let payloads: Vec<_> = set.iter().map(|i| i.payload).collect();
        assert_eq!(payloads, ["z", "a", "b", "c"]);
        assert!(set.is_sorted());
    }

    #[test]
    fn filter_keeps_order_and_is_idempotent() {
        let set = IntervalSet::new(vec![iv(0.0, 1.0, "a"), iv(1.0, 4.0, "b"), iv(2.0, 2.5, "c")]);
        let long = |i: &Interval<&str>| i.length() >= 1.0;
        let once = set.clone().filter(long);
        let twice = once.clone().filter(long);
        assert_eq!(once.intervals(), twice.intervals());
        assert_eq!(once.len(), 2);
        assert!(set.filter(|_| false).is_empty());
    }

    #[test]
    fn map_resorts() {
        let set = IntervalSet::new(vec![iv(0.0, 1.0, "a"), iv(5.0, 6.0, "b")]);
        let shifted = set.map(|i| {
            let t = if i.payload == "a" { 10.0 } else { 0.0 };
            let bounds = Bounds::temporal(i.t1() + t, i.t2() + t);
            i.with_bounds(bounds)
        });
        assert_eq!(shifted.intervals()[0].payload, "b");
        assert!(shifted.is_sorted());
    }

    #[test]
    fn union_keeps_duplicates() {
        let a = IntervalSet::new(vec![iv(0.0, 1.0, "a")]);
        let b = IntervalSet::new(vec![iv(0.0, 1.0, "a"), iv(-1.0, 0.0, "b")]);
        let u = a.union(b);
        assert_eq!(u.len(), 3);
        assert_eq!(u.intervals()[0].payload, "b");
    }

    #[test]
    fn group_by_folds_each_bucket() {
        let set = IntervalSet::new(vec![
            iv(0.0, 1.0, "a"),
            iv(4.0, 5.0, "a"),
            iv(2.0, 3.0, "b"),
        ]);
        let grouped = set.group_by(
            |i| i.payload,
            |key, bucket| {
                let bounds = bucket.bounding_box().unwrap_or_default();
                Interval::new(bounds, (*key, bucket.len()))
            },
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.intervals()[0].payload, ("a", 2));
        assert_eq!(grouped.intervals()[0].t2(), 5.0);
        assert_eq!(grouped.intervals()[1].payload, ("b", 1));
    }

    #[test]
    fn fold_by_uses_custom_order() {
        let set = IntervalSet::new(vec![iv(0.0, 3.0, "long"), iv(1.0, 1.5, "short")]);
        let by_length = set.fold_by(
            |a, b| a.length().total_cmp(&b.length()),
            Vec::new(),
            |mut acc, i| {
                acc.push(i.payload);
                acc
            },
        );
        assert_eq!(by_length, ["short", "long"]);
        assert_eq!(set.fold(0.0, |acc, i| acc + i.length()), set.total_time());
    }

    #[test]
    fn size_filter_and_dilate() {
        let set = IntervalSet::new(vec![iv(0.0, 1.0, "a"), iv(2.0, 5.0, "b")]);
        let long = set.clone().filter_size(2.0, None);
        assert_eq!(long.len(), 1);
        let bounded = set.clone().filter_size(0.5, Some(1.0));
        assert_eq!(bounded.intervals()[0].payload, "a");

        let grown = set.dilate(0.5);
        assert_eq!(grown.intervals()[0].bounds.t, AxisRange::new(-0.5, 1.5));
    }

    #[test]
    fn default_window_follows_extent() {
        let set = IntervalSet::new(vec![iv(0.0, 1.0, "a"), iv(5.0, 10.0, "b")]);
        assert_eq!(set.default_window(), 10.0);
        assert_eq!(IntervalSet::<()>::empty().default_window(), 0.0);

        let big: IntervalSet<()> = (0..2000)
            .map(|i| Interval::new(Bounds::temporal(i as f64, i as f64 + 1.0), ()))
            .collect();
        assert!((big.default_window() - 20.0).abs() < 1e-9);
    }
}
