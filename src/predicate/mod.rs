//! Composable predicates over pairs of bounds.
//!
//! A [`BoundsPredicate`] is a shareable boolean test over two [`Bounds`],
//! tagged with the axes it reads. The tag is what makes a predicate
//! *windowable*: one that only reads `t` can bound how far apart in time two
//! matching intervals may be, and [`IntervalSet::join_on`] uses that to pick
//! its admission window.
//!
//! Axis relations are built from the [`Axis`] enum:
//!
//! ```
//! use stalgebra::model::{Axis, Bounds};
//!
//! let same_shot = Axis::T.equal().and(Axis::X.overlaps()).and(Axis::Y.overlaps());
//! let a = Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
//! let b = Bounds::new(0.0, 1.0, 0.5, 1.5, 0.0, 1.0);
//! assert!(same_shot.matches(&a, &b));
//! ```
//!
//! [`IntervalSet::join_on`]: crate::set::IntervalSet::join_on

mod relations;
pub mod spatial;

use std::fmt;
use std::sync::Arc;

use crate::model::{Axis, Bounds, Interval};

pub use relations::Relation;
pub use spatial::BoundsFilter;

type BoundsFn = dyn Fn(&Bounds, &Bounds) -> bool + Send + Sync;

/// A set of declared axes.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSet(u8);

impl AxisSet {
    pub const EMPTY: AxisSet = AxisSet(0);
    pub const ALL: AxisSet = AxisSet(0b111);

    #[inline]
    fn bit(axis: Axis) -> u8 {
        match axis {
            Axis::T => 0b001,
            Axis::X => 0b010,
            Axis::Y => 0b100,
        }
    }

    #[inline]
    pub fn of(axis: Axis) -> Self {
        AxisSet(Self::bit(axis))
    }

    #[inline]
    pub fn with(self, axis: Axis) -> Self {
        AxisSet(self.0 | Self::bit(axis))
    }

    #[inline]
    pub fn union(self, other: AxisSet) -> Self {
        AxisSet(self.0 | other.0)
    }

    #[inline]
    pub fn contains(self, axis: Axis) -> bool {
        self.0 & Self::bit(axis) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |&a| self.contains(a))
    }
}

impl fmt::Debug for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Which axes a raw predicate reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cast {
    Axis(Axis),
    Pair(Axis, Axis),
    /// Reads anything; never windowable.
    Opaque,
}

impl Cast {
    fn reads(self) -> Option<AxisSet> {
        match self {
            Cast::Axis(a) => Some(AxisSet::of(a)),
            Cast::Pair(a, b) => Some(AxisSet::of(a).with(b)),
            Cast::Opaque => None,
        }
    }
}

/// A binary predicate over [`Bounds`] plus casting metadata.
///
/// Cloning is cheap; the test itself is shared behind an `Arc`.
#[derive(Clone)]
pub struct BoundsPredicate {
    test: Arc<BoundsFn>,
    // None means opaque
    reads: Option<AxisSet>,
    reach: Option<f64>,
}

impl BoundsPredicate {
    /// Wraps a raw predicate, declaring the axes it reads.
    pub fn casted<F>(f: F, cast: Cast) -> Self
    where
        F: Fn(&Bounds, &Bounds) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(f),
            reads: cast.reads(),
            reach: None,
        }
    }

    /// A relation evaluated on one axis.
    pub fn relation(axis: Axis, relation: Relation, epsilon: f64) -> Self {
        let reach = if axis.is_primary() {
            relation.reach(epsilon)
        } else {
            None
        };
        Self {
            test: Arc::new(move |a: &Bounds, b: &Bounds| {
                relation.holds(a.range(axis), b.range(axis), epsilon)
            }),
            reads: Some(AxisSet::of(axis)),
            reach,
        }
    }

    /// Declares the largest time separation at which this predicate can
    /// hold. Ignored unless the predicate reads `t`.
    pub fn with_temporal_reach(mut self, reach: f64) -> Self {
        if self.reads.is_some_and(|r| r.contains(Axis::T)) {
            self.reach = Some(reach.max(0.0));
        }
        self
    }

    #[inline]
    pub fn matches(&self, a: &Bounds, b: &Bounds) -> bool {
        (self.test)(a, b)
    }

    /// Evaluates on the bounds of two intervals.
    #[inline]
    pub fn test<P, Q>(&self, a: &Interval<P>, b: &Interval<Q>) -> bool {
        self.matches(&a.bounds, &b.bounds)
    }

    /// Axes read by the predicate, `None` if opaque.
    pub fn reads(&self) -> Option<AxisSet> {
        self.reads
    }

    /// True if the predicate reads only the primary axis.
    pub fn is_windowable(&self) -> bool {
        self.reads == Some(AxisSet::of(Axis::T))
    }

    /// Largest time separation at which the predicate can hold, if known.
    pub fn temporal_reach(&self) -> Option<f64> {
        self.reach
    }

    /// Both predicates must hold; `self` is evaluated first.
    pub fn and(self, other: BoundsPredicate) -> BoundsPredicate {
        and_pred([self, other])
    }

    /// Either predicate holds; `self` is evaluated first.
    pub fn or(self, other: BoundsPredicate) -> BoundsPredicate {
        or_pred([self, other])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> BoundsPredicate {
        not_pred(self)
    }

    /// Same test with operands swapped.
    ///
    /// Admission is symmetric in its operands, so the reach carries over.
    pub fn flip(self) -> BoundsPredicate {
        let test = self.test;
        BoundsPredicate {
            test: Arc::new(move |a: &Bounds, b: &Bounds| test(b, a)),
            reads: self.reads,
            reach: self.reach,
        }
    }
}

impl fmt::Debug for BoundsPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundsPredicate")
            .field("reads", &self.reads)
            .field("reach", &self.reach)
            .finish_non_exhaustive()
    }
}

fn union_reads<'a>(preds: impl Iterator<Item = &'a BoundsPredicate>) -> Option<AxisSet> {
    let mut reads = AxisSet::EMPTY;
    for p in preds {
        reads = reads.union(p.reads?);
    }
    Some(reads)
}

/// All predicates must hold. Evaluates left to right and stops at the first
/// failure. The empty conjunction is always true.
pub fn and_pred<I>(preds: I) -> BoundsPredicate
where
    I: IntoIterator<Item = BoundsPredicate>,
{
    let preds: Vec<BoundsPredicate> = preds.into_iter().collect();
    let reads = union_reads(preds.iter());
    // Every conjunct must hold, so the tightest bounded one limits the pair.
    let reach = preds
        .iter()
        .filter_map(|p| p.reach)
        .min_by(|a, b| a.total_cmp(b));
    let tests: Vec<Arc<BoundsFn>> = preds.into_iter().map(|p| p.test).collect();
    BoundsPredicate {
        test: Arc::new(move |a: &Bounds, b: &Bounds| tests.iter().all(|t| t(a, b))),
        reads,
        reach,
    }
}

/// Any predicate holds. Evaluates left to right and stops at the first
/// success. The empty disjunction is always false.
pub fn or_pred<I>(preds: I) -> BoundsPredicate
where
    I: IntoIterator<Item = BoundsPredicate>,
{
    let preds: Vec<BoundsPredicate> = preds.into_iter().collect();
    let reads = union_reads(preds.iter());
    let reach = if preds.is_empty() {
        None
    } else {
        preds
            .iter()
            .map(|p| p.reach)
            .try_fold(0.0_f64, |acc, r| r.map(|r| acc.max(r)))
    };
    let tests: Vec<Arc<BoundsFn>> = preds.into_iter().map(|p| p.test).collect();
    BoundsPredicate {
        test: Arc::new(move |a: &Bounds, b: &Bounds| tests.iter().any(|t| t(a, b))),
        reads,
        reach,
    }
}

/// Negation. The result reads the same axes but has no temporal reach.
pub fn not_pred(pred: BoundsPredicate) -> BoundsPredicate {
    let test = pred.test;
    BoundsPredicate {
        test: Arc::new(move |a: &Bounds, b: &Bounds| !test(a, b)),
        reads: pred.reads,
        reach: None,
    }
}

pub fn true_pred() -> BoundsPredicate {
    BoundsPredicate {
        test: Arc::new(|_: &Bounds, _: &Bounds| true),
        reads: Some(AxisSet::EMPTY),
        reach: None,
    }
}

pub fn false_pred() -> BoundsPredicate {
    BoundsPredicate {
        test: Arc::new(|_: &Bounds, _: &Bounds| false),
        reads: Some(AxisSet::EMPTY),
        reach: None,
    }
}

/// Relation builder for one axis with a boundary tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisCast {
    pub axis: Axis,
    pub epsilon: f64,
}

impl AxisCast {
    #[inline]
    pub fn relation(self, relation: Relation) -> BoundsPredicate {
        BoundsPredicate::relation(self.axis, relation, self.epsilon)
    }

    pub fn equal(self) -> BoundsPredicate {
        self.relation(Relation::Equal)
    }

    pub fn overlaps(self) -> BoundsPredicate {
        self.relation(Relation::Overlaps)
    }

    pub fn before(self, max_gap: Option<f64>) -> BoundsPredicate {
        self.relation(Relation::before(max_gap))
    }

    /// `before` with the gap also bounded below by `min_gap`.
    pub fn before_between(self, min_gap: f64, max_gap: Option<f64>) -> BoundsPredicate {
        self.relation(Relation::Before { min_gap, max_gap })
    }

    pub fn after(self, max_gap: Option<f64>) -> BoundsPredicate {
        self.relation(Relation::after(max_gap))
    }

    pub fn after_between(self, min_gap: f64, max_gap: Option<f64>) -> BoundsPredicate {
        self.relation(Relation::After { min_gap, max_gap })
    }

    pub fn meets(self) -> BoundsPredicate {
        self.relation(Relation::Meets)
    }

    pub fn met_by(self) -> BoundsPredicate {
        self.relation(Relation::MetBy)
    }

    pub fn during(self) -> BoundsPredicate {
        self.relation(Relation::During)
    }

    pub fn contains(self) -> BoundsPredicate {
        self.relation(Relation::Contains)
    }

    pub fn starts(self) -> BoundsPredicate {
        self.relation(Relation::Starts)
    }

    pub fn starts_inv(self) -> BoundsPredicate {
        self.relation(Relation::StartsInv)
    }

    pub fn finishes(self) -> BoundsPredicate {
        self.relation(Relation::Finishes)
    }

    pub fn finishes_inv(self) -> BoundsPredicate {
        self.relation(Relation::FinishesInv)
    }

    pub fn overlaps_before(self) -> BoundsPredicate {
        self.relation(Relation::OverlapsBefore)
    }

    pub fn overlaps_after(self) -> BoundsPredicate {
        self.relation(Relation::OverlapsAfter)
    }

    /// Meets or overlaps, the usual adjacency test for coalescing.
    pub fn meets_or_overlaps(self) -> BoundsPredicate {
        or_pred([self.overlaps(), self.meets(), self.met_by()])
    }
}

/// Exact (zero-tolerance) relation shortcuts, e.g. `Axis::T.overlaps()`.
impl Axis {
    /// Relation builder with boundary tolerance `epsilon`.
    #[inline]
    pub fn with_epsilon(self, epsilon: f64) -> AxisCast {
        AxisCast {
            axis: self,
            epsilon,
        }
    }

    #[inline]
    fn exact(self) -> AxisCast {
        self.with_epsilon(0.0)
    }

    pub fn relation(self, relation: Relation) -> BoundsPredicate {
        self.exact().relation(relation)
    }

    pub fn equal(self) -> BoundsPredicate {
        self.exact().equal()
    }

    pub fn overlaps(self) -> BoundsPredicate {
        self.exact().overlaps()
    }

    pub fn before(self, max_gap: Option<f64>) -> BoundsPredicate {
        self.exact().before(max_gap)
    }

    pub fn after(self, max_gap: Option<f64>) -> BoundsPredicate {
        self.exact().after(max_gap)
    }

    pub fn before_between(self, min_gap: f64, max_gap: Option<f64>) -> BoundsPredicate {
        self.exact().before_between(min_gap, max_gap)
    }

    pub fn after_between(self, min_gap: f64, max_gap: Option<f64>) -> BoundsPredicate {
        self.exact().after_between(min_gap, max_gap)
    }

    pub fn meets(self) -> BoundsPredicate {
        self.exact().meets()
    }

    pub fn met_by(self) -> BoundsPredicate {
        self.exact().met_by()
    }

    pub fn during(self) -> BoundsPredicate {
        self.exact().during()
    }

    pub fn contains(self) -> BoundsPredicate {
        self.exact().contains()
    }

    pub fn starts(self) -> BoundsPredicate {
        self.exact().starts()
    }

    pub fn finishes(self) -> BoundsPredicate {
        self.exact().finishes()
    }

    pub fn meets_or_overlaps(self) -> BoundsPredicate {
        self.exact().meets_or_overlaps()
    }
}

/// Overlaps on `t`, `x` and `y` at once.
pub fn overlaps_3d() -> BoundsPredicate {
    and_pred(Axis::ALL.map(Axis::overlaps))
}

/// Meets or overlaps on every axis.
pub fn touches_3d() -> BoundsPredicate {
    and_pred(Axis::ALL.map(Axis::meets_or_overlaps))
}

/// Lifts a payload test to an interval test.
pub fn payload_satisfies<P, F>(f: F) -> impl Fn(&Interval<P>) -> bool
where
    F: Fn(&P) -> bool,
{
    move |i: &Interval<P>| f(&i.payload)
}

/// A numeric payload value within `epsilon` of `target`.
///
/// `value` extracts the number to compare, e.g. `|d: &Detection| d.score.unwrap_or(0.0)`.
pub fn has_value<P, F>(value: F, target: f64, epsilon: f64) -> impl Fn(&Interval<P>) -> bool
where
    F: Fn(&P) -> f64,
{
    move |i: &Interval<P>| (value(&i.payload) - target).abs() < epsilon
}

/// Two payloads whose extracted values differ by less than `epsilon`.
pub fn same_value<P, F>(value: F, epsilon: f64) -> impl Fn(&Interval<P>, &Interval<P>) -> bool
where
    F: Fn(&P) -> f64,
{
    move |a: &Interval<P>, b: &Interval<P>| {
        (value(&a.payload) - value(&b.payload)).abs() < epsilon
    }
}

/// Lifts a two-payload test to an interval pair test.
pub fn payloads_satisfy<P, Q, F>(f: F) -> impl Fn(&Interval<P>, &Interval<Q>) -> bool
where
    F: Fn(&P, &Q) -> bool,
{
    move |a: &Interval<P>, b: &Interval<Q>| f(&a.payload, &b.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn b(t1: f64, t2: f64) -> Bounds {
        Bounds::temporal(t1, t2)
    }

    #[test]
    fn scenario_predicate_matches_offset_box() {
        let pred = and_pred([Axis::T.equal(), Axis::X.overlaps(), Axis::Y.overlaps()]);
        let a = Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0);
        let c = Bounds::new(0.0, 1.0, 0.5, 1.5, 0.0, 1.0);
        assert!(pred.matches(&a, &c));
        assert!(!pred.matches(&a, &Bounds::new(0.0, 1.0, 1.5, 2.0, 0.0, 1.0)));
        assert_eq!(pred.temporal_reach(), Some(0.0));
        assert!(!pred.is_windowable());
    }

    #[test]
    fn and_short_circuits_left_to_right() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counted = BoundsPredicate::casted(
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            },
            Cast::Opaque,
        );
        let pred = and_pred([false_pred(), counted.clone()]);
        assert!(!pred.matches(&b(0.0, 1.0), &b(0.0, 1.0)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let pred = or_pred([true_pred(), counted]);
        assert!(pred.matches(&b(0.0, 1.0), &b(0.0, 1.0)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn windowable_only_when_reading_time_alone() {
        assert!(Axis::T.overlaps().is_windowable());
        assert!(!Axis::X.overlaps().is_windowable());
        assert!(!BoundsPredicate::casted(|_, _| true, Cast::Opaque).is_windowable());
        assert!(BoundsPredicate::casted(|_, _| true, Cast::Axis(Axis::T)).is_windowable());
        assert!(!BoundsPredicate::casted(|_, _| true, Cast::Pair(Axis::T, Axis::X)).is_windowable());
        assert!(Axis::T.before(None).or(Axis::T.meets()).is_windowable());
    }

    #[test]
    fn reach_combines_through_and_or_not() {
        let near = Axis::T.before(Some(2.0));
        let far = Axis::T.before(Some(5.0));
        assert_eq!(near.clone().and(far.clone()).temporal_reach(), Some(2.0));
        assert_eq!(near.clone().or(far.clone()).temporal_reach(), Some(5.0));
        assert_eq!(near.clone().or(Axis::X.overlaps()).temporal_reach(), None);
        assert_eq!(near.clone().and(Axis::X.overlaps()).temporal_reach(), Some(2.0));
        assert_eq!(near.not().temporal_reach(), None);
        assert_eq!(Axis::T.before(None).temporal_reach(), None);
    }

    #[test]
    fn empty_combinators() {
        let x = b(0.0, 1.0);
        assert!(and_pred(Vec::new()).matches(&x, &x));
        assert!(!or_pred(Vec::new()).matches(&x, &x));
    }

    #[test]
    fn flip_swaps_operands() {
        let before = Axis::T.before(None);
        assert!(before.matches(&b(0.0, 1.0), &b(2.0, 3.0)));
        let flipped = before.flip();
        assert!(!flipped.matches(&b(0.0, 1.0), &b(2.0, 3.0)));
        assert!(flipped.matches(&b(2.0, 3.0), &b(0.0, 1.0)));
        assert_eq!(flipped.temporal_reach(), None);
    }

    #[test]
    fn epsilon_builder() {
        let loose = Axis::T.with_epsilon(0.2).meets();
        assert!(loose.matches(&b(0.0, 1.0), &b(1.1, 2.0)));
        assert!(!Axis::T.meets().matches(&b(0.0, 1.0), &b(1.1, 2.0)));
        assert_eq!(loose.temporal_reach(), Some(0.2));
    }

    #[test]
    fn three_dimensional_overlap() {
        let a = Bounds::new(0.0, 1.0, 0.0, 0.5, 0.0, 0.5);
        let c = Bounds::new(0.5, 1.5, 0.4, 0.8, 0.4, 0.8);
        let d = Bounds::new(0.5, 1.5, 0.5, 0.8, 0.4, 0.8);
        assert!(overlaps_3d().matches(&a, &c));
        assert!(!overlaps_3d().matches(&a, &d));
        assert!(touches_3d().matches(&a, &d));
    }

    #[test]
    fn payload_adapters_read_payloads() {
        let a = Interval::new(b(0.0, 1.0), 3);
        let c = Interval::new(b(0.0, 1.0), "x");
        assert!(payload_satisfies(|p: &i32| *p > 2)(&a));
        assert!(!payloads_satisfy(|p: &i32, q: &&str| *p == 3 && *q == "y")(&a, &c));
    }

    #[test]
    fn numeric_payload_values() {
        let low = Interval::new(b(0.0, 1.0), 0.30);
        let high = Interval::new(b(2.0, 3.0), 0.75);
        let score = |p: &f64| *p;
        assert!(has_value(score, 0.25, 0.1)(&low));
        assert!(!has_value(score, 0.25, 0.1)(&high));
        assert!(same_value(score, 0.5)(&low, &high));
        assert!(!same_value(score, 0.4)(&low, &high));
    }

    #[test]
    fn gap_bounded_on_both_sides() {
        let gap = Axis::T.before_between(1.0, Some(2.0));
        assert!(!gap.matches(&b(0.0, 1.0), &b(1.5, 2.0)));
        assert!(gap.matches(&b(0.0, 1.0), &b(2.0, 3.0)));
        assert!(gap.matches(&b(0.0, 1.0), &b(3.0, 4.0)));
        assert!(!gap.matches(&b(0.0, 1.0), &b(3.5, 4.0)));
        assert_eq!(gap.temporal_reach(), Some(2.0));

        let after = Axis::T.with_epsilon(0.25).after_between(1.0, None);
        assert!(after.matches(&b(1.75, 2.0), &b(0.0, 1.0)));
        assert!(!after.matches(&b(1.5, 2.0), &b(0.0, 1.0)));
        assert_eq!(after.temporal_reach(), None);
    }
}
