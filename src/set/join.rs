//! Windowed join.
//!
//! A pair `(a, b)` is *admitted* when
//! `b.t1 < a.t2 + window && b.t2 + window > a.t1`. Only admitted pairs reach
//! the predicate. Both sides are sorted by `t1`, so a single sweep finds
//! them: a lower cursor into the right side skips entries that can no longer
//! be admitted by this or any later `a`, and the scan for each `a` stops at
//! the first `b` that starts too late.

use std::convert::Infallible;

use super::IntervalSet;
use crate::error::{BoxError, StalgebraError};
use crate::model::Interval;
use crate::predicate::BoundsPredicate;

/// Counters gathered during one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Pairs that passed the window test.
    pub admitted: usize,
    /// Admitted pairs accepted by the predicate.
    pub matched: usize,
}

/// Returns true if `(a, b)` passes the admission filter.
#[inline]
pub(crate) fn admitted<P, Q>(a: &Interval<P>, b: &Interval<Q>, window: f64) -> bool {
    b.t1() < a.t2() + window && b.t2() + window > a.t1()
}

/// Visits every admitted pair, left side ascending then right side
/// ascending. `visit` receives the index of `a` and reports whether the
/// pair matched.
pub(crate) fn sweep<P, Q, E, F>(
    left: &[Interval<P>],
    right: &[Interval<Q>],
    window: f64,
    mut visit: F,
) -> Result<JoinStats, E>
where
    F: FnMut(usize, &Interval<P>, &Interval<Q>) -> Result<bool, E>,
{
    let mut stats = JoinStats::default();
    if left.is_empty() || right.is_empty() {
        return Ok(stats);
    }

    let mut lower = 0;
    for (index, a) in left.iter().enumerate() {
        // a.t1 never decreases, so a dead prefix stays dead
        while lower < right.len() && right[lower].t2() + window <= a.t1() {
            lower += 1;
        }
        for b in &right[lower..] {
            if b.t1() >= a.t2() + window {
                break;
            }
            // a long b earlier in the order can shadow shorter dead ones
            if b.t2() + window <= a.t1() {
                continue;
            }
            stats.admitted += 1;
            if visit(index, a, b)? {
                stats.matched += 1;
            }
        }
    }
    Ok(stats)
}

fn never<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// A window slightly above `reach`, enough to survive rounding in
/// `a.t2 + window` for the magnitudes in `scale`.
fn window_above(reach: f64, scale: f64) -> f64 {
    let slack = (scale.abs() + reach.abs()) * 1e-12;
    reach + slack.max(f64::MIN_POSITIVE)
}

impl<P> IntervalSet<P> {
    /// Windowed join.
    ///
    /// Produces `merge_op(a, b)` for every admitted pair with
    /// `predicate(a, b)`. Results are generated by `a` then by `b` and then
    /// stably sorted, so pairs whose merged bounds tie keep that order.
    ///
    /// A `window` of zero admits only pairs that truly overlap in time;
    /// touching intervals (`a.t2 == b.t1`) are not admitted.
    pub fn join<Q, R, F, M>(
        &self,
        other: &IntervalSet<Q>,
        predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> IntervalSet<R>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
        M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
    {
        self.flat_join(
            other,
            predicate,
            |a, b| std::iter::once(merge_op(a, b)),
            window,
        )
    }

    /// Like [`join`](Self::join), but `merge_op` may emit any number of
    /// intervals per matching pair (e.g. an `Option`).
    pub fn flat_join<Q, R, F, M, I>(
        &self,
        other: &IntervalSet<Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> IntervalSet<R>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
        M: FnMut(&Interval<P>, &Interval<Q>) -> I,
        I: IntoIterator<Item = Interval<R>>,
    {
        let mut output = Vec::new();
        let stats = never(sweep(
            self.intervals(),
            other.intervals(),
            window,
            |_, a, b| {
                if !predicate(a, b) {
                    return Ok(false);
                }
                output.extend(merge_op(a, b));
                Ok(true)
            },
        ));
        log_stats(self.len(), other.len(), window, &stats);
        IntervalSet::new(output)
    }

    /// Join with fallible predicate and merge functions.
    ///
    /// The first failure aborts the whole join: no partial result is
    /// returned. Predicate errors surface as
    /// [`StalgebraError::PredicateFailure`], merge errors as
    /// [`StalgebraError::MergeFailure`].
    pub fn try_join<Q, R, F, M, EP, EM>(
        &self,
        other: &IntervalSet<Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> Result<IntervalSet<R>, StalgebraError>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> Result<bool, EP>,
        M: FnMut(&Interval<P>, &Interval<Q>) -> Result<Interval<R>, EM>,
        EP: Into<BoxError>,
        EM: Into<BoxError>,
    {
        let mut output = Vec::new();
        let visit = |_: usize, a: &Interval<P>, b: &Interval<Q>| {
            if !predicate(a, b).map_err(StalgebraError::predicate)? {
                return Ok::<bool, StalgebraError>(false);
            }
            output.push(merge_op(a, b).map_err(StalgebraError::merge)?);
            Ok(true)
        };
        let stats = sweep(self.intervals(), other.intervals(), window, visit)?;
        log_stats(self.len(), other.len(), window, &stats);
        Ok(IntervalSet::new(output))
    }

    /// Join on a [`BoundsPredicate`], deriving the window from it.
    ///
    /// When the predicate has a temporal reach, the window is just above
    /// it, so no pair the predicate accepts is filtered out by admission.
    /// Otherwise the receiver's [`default_window`](Self::default_window) is
    /// used.
    pub fn join_on<Q, R, M>(
        &self,
        other: &IntervalSet<Q>,
        predicate: &BoundsPredicate,
        merge_op: M,
    ) -> IntervalSet<R>
    where
        M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
    {
        let window = self.window_for(other, predicate);
        self.join(other, |a, b| predicate.test(a, b), merge_op, window)
    }

    /// The admission window [`join_on`](Self::join_on) would use.
    pub fn window_for<Q>(&self, other: &IntervalSet<Q>, predicate: &BoundsPredicate) -> f64 {
        match predicate.temporal_reach() {
            Some(reach) => {
                let scale = [self.time_extent(), other.time_extent()]
                    .into_iter()
                    .flatten()
                    .map(|r| r.lo.abs().max(r.hi.abs()))
                    .filter(|v| v.is_finite())
                    .fold(0.0, f64::max);
                window_above(reach, scale)
            }
            None => self.default_window(),
        }
    }

    /// Keeps each `a` for which some admitted `b` satisfies `predicate`.
    pub fn filter_against<Q, F>(
        self,
        other: &IntervalSet<Q>,
        mut predicate: F,
        window: f64,
    ) -> IntervalSet<P>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
    {
        let mut keep = vec![false; self.len()];
        let stats = never(sweep(
            self.intervals(),
            other.intervals(),
            window,
            |index, a, b| {
                if keep[index] {
                    return Ok(false);
                }
                keep[index] = predicate(a, b);
                Ok(keep[index])
            },
        ));
        log_stats(self.len(), other.len(), window, &stats);
        let intervals = self
            .into_intervals()
            .into_iter()
            .zip(keep)
            .filter_map(|(interval, kept)| kept.then_some(interval))
            .collect();
        IntervalSet { intervals }
    }

    /// Brute-force join evaluating every pair against the admission test.
    ///
    /// Same output as [`join`](Self::join); kept as a reference for tests
    /// and benchmarks.
    pub fn join_naive<Q, R, F, M>(
        &self,
        other: &IntervalSet<Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> IntervalSet<R>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
        M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
    {
        let mut output = Vec::new();
        for a in self.intervals() {
            for b in other.intervals() {
                if admitted(a, b, window) && predicate(a, b) {
                    output.push(merge_op(a, b));
                }
            }
        }
        IntervalSet::new(output)
    }
}

fn log_stats(left: usize, right: usize, window: f64, stats: &JoinStats) {
    log::debug!(
        "join {}x{} window={}: {} admitted, {} matched",
        left,
        right,
        window,
        stats.admitted,
        stats.matched
    );
}
