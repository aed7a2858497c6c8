//! Single-pass merging of adjacent or overlapping intervals.

use super::IntervalSet;
use crate::model::Interval;

impl<P> IntervalSet<P> {
    /// Merges intervals for which `predicate` holds.
    ///
    /// One left-to-right sweep over the sorted set. Each interval is folded
    /// into the first still-open accumulated interval that `predicate`
    /// accepts (accumulated first, incoming second); bounds are combined
    /// with [`Bounds::span`](crate::model::Bounds::span) and payloads with
    /// `merge_op`. An accumulated interval is closed once its `t2` lies
    /// strictly before the incoming `t1`.
    ///
    /// This is best-effort: if `predicate` is not transitive, two results
    /// may still satisfy it after the sweep.
    pub fn coalesce<F, M>(self, predicate: F, merge_op: M) -> IntervalSet<P>
    where
        F: FnMut(&Interval<P>, &Interval<P>) -> bool,
        M: FnMut(&P, &P) -> P,
    {
        self.coalesce_within(predicate, merge_op, 0.0)
    }

    /// [`coalesce`](Self::coalesce) keeping accumulated intervals open for
    /// `epsilon` past their end, so gaps up to `epsilon` can be bridged.
    pub fn coalesce_within<F, M>(self, mut predicate: F, mut merge_op: M, epsilon: f64) -> IntervalSet<P>
    where
        F: FnMut(&Interval<P>, &Interval<P>) -> bool,
        M: FnMut(&P, &P) -> P,
    {
        let input = self.len();
        let mut done: Vec<Interval<P>> = Vec::with_capacity(input);
        let mut open: Vec<Interval<P>> = Vec::new();

        for incoming in self.into_intervals() {
            let start = incoming.t1();
            let (retired, still_open): (Vec<_>, Vec<_>) = open
                .into_iter()
                .partition(|cur| cur.t2() + epsilon < start);
            done.extend(retired);
            open = still_open;

            match open.iter_mut().find(|cur| predicate(cur, &incoming)) {
                Some(cur) => {
                    cur.payload = merge_op(&cur.payload, &incoming.payload);
                    cur.bounds = cur.bounds.span(&incoming.bounds);
                }
                None => open.push(incoming),
            }
        }
        done.extend(open);

        log::debug!("coalesce: {} -> {} interval(s)", input, done.len());
        IntervalSet::new(done)
    }
}
