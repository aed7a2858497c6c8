//! Temporal difference.

use super::IntervalSet;
use crate::model::{AxisRange, Interval};
use crate::predicate::Relation;

impl<P: Clone> IntervalSet<P> {
    /// Removes from each interval the time covered by intervals of `other`
    /// that overlap it in time.
    ///
    /// Only `t` is clipped; the spatial extent of `other` is ignored and
    /// remainders keep the receiver's spatial bounds and payload. An
    /// interval may split into several pieces. Fully covered intervals are
    /// dropped; intervals nothing overlaps come through unchanged.
    /// Zero-length intervals in `other` remove nothing.
    pub fn minus<Q>(self, other: &IntervalSet<Q>) -> IntervalSet<P> {
        let cutters: Vec<AxisRange> = other
            .iter()
            .map(|b| b.bounds.t)
            .filter(|t| t.length() > 0.0)
            .collect();
        if cutters.is_empty() {
            return self;
        }

        let mut output = Vec::with_capacity(self.len());
        let mut lower = 0;
        let mut split = 0usize;
        for a in self.into_intervals() {
            let t = a.bounds.t;
            while lower < cutters.len() && cutters[lower].hi < t.lo {
                lower += 1;
            }

            let mut cursor = t.lo;
            let mut touched = false;
            let mut pieces = Vec::new();
            for cut in &cutters[lower..] {
                if cut.lo > t.hi || (touched && cursor >= t.hi) {
                    break;
                }
                if !Relation::Overlaps.holds(t, *cut, 0.0) {
                    continue;
                }
                touched = true;
                if cut.lo > cursor {
                    pieces.push(AxisRange::new(cursor, cut.lo));
                }
                cursor = cursor.max(cut.hi);
            }

            if !touched {
                output.push(a);
                continue;
            }
            if cursor < t.hi {
                pieces.push(AxisRange::new(cursor, t.hi));
            }
            split += 1;
            output.extend(pieces.into_iter().map(|piece| {
                Interval::new(a.bounds.with_time(piece.lo, piece.hi), a.payload.clone())
            }));
        }
        log::debug!("minus: {} interval(s) clipped", split);
        IntervalSet::new(output)
    }
}
