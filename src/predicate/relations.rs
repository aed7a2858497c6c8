//! One-dimensional interval relations.
//!
//! These are Allen's relations over closed ranges, with an epsilon that
//! loosens the boundary comparisons. `Overlaps` is the colloquial variant:
//! it also holds for containment and equality, and `Before`/`After` accept
//! touching ranges.

use crate::model::AxisRange;

/// A relation between two ranges `a` (left operand) and `b` (right operand).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Relation {
    /// Same start and same end.
    Equal,
    /// Any overlap, including containment either way.
    Overlaps,
    /// `a` ends at least `min_gap` before `b` starts, and at most
    /// `max_gap` before when bounded.
    Before { min_gap: f64, max_gap: Option<f64> },
    /// `a` starts at least `min_gap` after `b` ends, and at most `max_gap`
    /// after when bounded.
    After { min_gap: f64, max_gap: Option<f64> },
    /// `a` ends where `b` starts.
    Meets,
    /// `a` starts where `b` ends.
    MetBy,
    /// `a` lies strictly inside `b`.
    During,
    /// `b` lies strictly inside `a`.
    Contains,
    /// Same start, `a` ends first.
    Starts,
    /// Same start, `b` ends first.
    StartsInv,
    /// Same end, `a` starts last.
    Finishes,
    /// Same end, `b` starts last.
    FinishesInv,
    /// `a` starts first and ends inside `b`.
    OverlapsBefore,
    /// `b` starts first and ends inside `a`.
    OverlapsAfter,
}

impl Relation {
    /// Evaluates the relation.
    pub fn holds(&self, a: AxisRange, b: AxisRange, epsilon: f64) -> bool {
        match *self {
            Relation::Equal => {
                (a.lo - b.lo).abs() <= epsilon && (a.hi - b.hi).abs() <= epsilon
            }
            Relation::Overlaps => {
                (a.lo < b.lo && a.hi > b.lo)
                    || (a.lo < b.hi && a.hi > b.hi)
                    || (a.lo <= b.lo + epsilon && a.hi + epsilon >= b.hi)
                    || (a.lo + epsilon >= b.lo && a.hi <= b.hi + epsilon)
            }
            Relation::Before { min_gap, max_gap } => {
                gap_within(b.lo - a.hi, min_gap, max_gap, epsilon)
            }
            Relation::After { min_gap, max_gap } => {
                gap_within(a.lo - b.hi, min_gap, max_gap, epsilon)
            }
            Relation::Meets => (a.hi - b.lo).abs() <= epsilon,
            Relation::MetBy => (b.hi - a.lo).abs() <= epsilon,
            Relation::During => a.lo > b.lo && a.hi < b.hi,
            Relation::Contains => b.lo > a.lo && b.hi < a.hi,
            Relation::Starts => (a.lo - b.lo).abs() <= epsilon && a.hi < b.hi,
            Relation::StartsInv => (a.lo - b.lo).abs() <= epsilon && b.hi < a.hi,
            Relation::Finishes => (a.hi - b.hi).abs() <= epsilon && a.lo > b.lo,
            Relation::FinishesInv => (a.hi - b.hi).abs() <= epsilon && b.lo > a.lo,
            Relation::OverlapsBefore => a.lo < b.lo && a.hi > b.lo && a.hi < b.hi,
            Relation::OverlapsAfter => a.lo > b.lo && a.lo < b.hi && a.hi > b.hi,
        }
    }

    /// The relation with operands swapped.
    pub fn inverse(&self) -> Relation {
        match *self {
            Relation::Equal => Relation::Equal,
            Relation::Overlaps => Relation::Overlaps,
            Relation::Before { min_gap, max_gap } => Relation::After { min_gap, max_gap },
            Relation::After { min_gap, max_gap } => Relation::Before { min_gap, max_gap },
            Relation::Meets => Relation::MetBy,
            Relation::MetBy => Relation::Meets,
            Relation::During => Relation::Contains,
            Relation::Contains => Relation::During,
            Relation::Starts => Relation::StartsInv,
            Relation::StartsInv => Relation::Starts,
            Relation::Finishes => Relation::FinishesInv,
            Relation::FinishesInv => Relation::Finishes,
            Relation::OverlapsBefore => Relation::OverlapsAfter,
            Relation::OverlapsAfter => Relation::OverlapsBefore,
        }
    }

    /// Largest separation between two ranges for which the relation can
    /// still hold, or `None` if unbounded.
    ///
    /// Any join window strictly greater than this admits every pair the
    /// relation accepts on the time axis.
    pub fn reach(&self, epsilon: f64) -> Option<f64> {
        let epsilon = epsilon.max(0.0);
        match *self {
            Relation::Before { max_gap, .. } | Relation::After { max_gap, .. } => {
                max_gap.map(|gap| gap.max(0.0) + epsilon)
            }
            _ => Some(epsilon),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Relation::Equal => "equal",
            Relation::Overlaps => "overlaps",
            Relation::Before { .. } => "before",
            Relation::After { .. } => "after",
            Relation::Meets => "meets",
            Relation::MetBy => "met_by",
            Relation::During => "during",
            Relation::Contains => "contains",
            Relation::Starts => "starts",
            Relation::StartsInv => "starts_inv",
            Relation::Finishes => "finishes",
            Relation::FinishesInv => "finishes_inv",
            Relation::OverlapsBefore => "overlaps_before",
            Relation::OverlapsAfter => "overlaps_after",
        }
    }
}

fn gap_within(gap: f64, min_gap: f64, max_gap: Option<f64>, epsilon: f64) -> bool {
    gap >= min_gap - epsilon && max_gap.is_none_or(|max| gap <= max + epsilon)
}

impl Relation {
    /// `Before` with no lower bound on the gap.
    pub fn before(max_gap: Option<f64>) -> Relation {
        Relation::Before {
            min_gap: 0.0,
            max_gap,
        }
    }

    /// `After` with no lower bound on the gap.
    pub fn after(max_gap: Option<f64>) -> Relation {
        Relation::After {
            min_gap: 0.0,
            max_gap,
        }
    }
}
