use proptest::prelude::*;
use stalgebra::merge;
use stalgebra::model::{Axis, Interval};
use stalgebra::predicate::{overlaps_3d, BoundsPredicate};
use stalgebra::IntervalSet;

mod proptest_helpers;

use proptest_helpers::{arb_mapping, arb_set, contents, cross_product, STEP};

fn pair(a: &Interval<usize>, b: &Interval<usize>) -> Interval<(usize, usize)> {
    a.span_merge(b, |p, q| (*p, *q))
}

fn temporal_predicates() -> Vec<BoundsPredicate> {
    vec![
        Axis::T.overlaps(),
        Axis::T.equal(),
        Axis::T.meets(),
        Axis::T.during(),
        Axis::T.before(Some(1.0)),
        Axis::T.after(Some(0.5)),
        Axis::T.with_epsilon(STEP).starts(),
        Axis::T.before(Some(0.5)).or(Axis::T.overlaps()),
        Axis::T.overlaps().and(Axis::T.finishes().not()),
    ]
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn filter_is_idempotent(set in arb_set(20), cut in 0usize..20) {
        let keep = |i: &Interval<usize>| i.payload % 3 != cut % 3;
        let once = set.filter(keep);
        let twice = once.clone().filter(keep);
        prop_assert_eq!(contents(&once), contents(&twice));
    }

    #[test]
    fn every_operation_keeps_sets_sorted(a in arb_set(15), b in arb_set(15), window in 0u32..8) {
        let window = window as f64 * STEP;
        prop_assert!(a.is_sorted());
        prop_assert!(a.clone().filter(|i| i.payload % 2 == 0).is_sorted());
        let dilated = a.clone().map(|i| {
            let bounds = i.bounds.dilate(1.0);
            i.with_bounds(bounds)
        });
        prop_assert!(dilated.is_sorted());
        prop_assert!(a.clone().union(b.clone()).is_sorted());
        prop_assert!(a.clone().minus(&b).is_sorted());
        prop_assert!(a.join(&b, |_, _| true, pair, window).is_sorted());
        let touching = Axis::T.meets_or_overlaps();
        prop_assert!(a.clone().coalesce(|x, y| touching.test(x, y), merge::first_payload).is_sorted());
    }

    #[test]
    fn windowed_join_matches_naive(a in arb_set(20), b in arb_set(20), window in 0u32..12) {
        let window = window as f64 * STEP;
        let pred = overlaps_3d().or(Axis::T.before(Some(2.0)));
        let fast = a.join(&b, |x, y| pred.test(x, y), pair, window);
        let slow = a.join_naive(&b, |x, y| pred.test(x, y), pair, window);
        prop_assert_eq!(contents(&fast), contents(&slow));
    }

    #[test]
    fn join_on_misses_nothing_for_windowable_predicates(a in arb_set(15), b in arb_set(15)) {
        for pred in temporal_predicates() {
            prop_assert!(pred.is_windowable());
            let windowed = a.join_on(&b, &pred, pair);
            let full = cross_product(&a, &b, |x, y| pred.test(x, y), pair);
            prop_assert_eq!(contents(&windowed), contents(&full));
        }
    }

    #[test]
    fn join_commutes_under_flip(a in arb_set(15), b in arb_set(15), window in 0u32..8) {
        let window = window as f64 * STEP;
        let pred = Axis::T.before(Some(1.0)).or(Axis::X.overlaps());
        let flipped = pred.clone().flip();

        let mut forward: Vec<_> = a
            .join(&b, |x, y| pred.test(x, y), pair, window)
            .iter()
            .map(|i| (i.bounds, i.payload))
            .collect();
        let mut backward: Vec<_> = b
            .join(&a, |y, x| flipped.test(y, x), |y, x| pair(y, x), window)
            .iter()
            .map(|i| (i.bounds, (i.payload.1, i.payload.0)))
            .collect();
        let by_payload = |x: &(_, (usize, usize)), y: &(_, (usize, usize))| x.1.cmp(&y.1);
        forward.sort_by(by_payload);
        backward.sort_by(by_payload);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn span_is_tight(a in arb_set(10), b in arb_set(10)) {
        let joined = a.join(&b, |_, _| true, pair, 100.0);
        prop_assert_eq!(joined.len(), a.len() * b.len());
        for out in &joined {
            let (i, j) = out.payload;
            let (x, y) = (&a.intervals()[i].bounds, &b.intervals()[j].bounds);
            prop_assert!(out.bounds.encloses(x) && out.bounds.encloses(y));
            for axis in Axis::ALL {
                let (r, rx, ry) = (out.bounds.range(axis), x.range(axis), y.range(axis));
                prop_assert_eq!(r.lo, rx.lo.min(ry.lo));
                prop_assert_eq!(r.hi, rx.hi.max(ry.hi));
            }
        }
    }

    #[test]
    fn mapping_join_is_a_key_inner_join(left in arb_mapping(6, 6), right in arb_mapping(6, 6)) {
        let joined = left.join(&right, |_, _| true, pair, 1.0);
        let expected: Vec<u8> = left.shared_keys(&right).copied().collect();
        prop_assert_eq!(joined.keys().copied().collect::<Vec<_>>(), expected);

        for (key, set) in joined.iter() {
            let (l, r) = (left.get(key).unwrap(), right.get(key).unwrap());
            let direct = l.join(r, |_, _| true, pair, 1.0);
            prop_assert_eq!(contents(set), contents(&direct));
        }
    }

    #[test]
    fn empty_operands_give_empty_results(a in arb_set(10)) {
        let empty = IntervalSet::<usize>::empty();
        prop_assert!(a.join(&empty, |_, _| true, pair, 10.0).is_empty());
        prop_assert!(empty.join(&a, |_, _| true, pair, 10.0).is_empty());
        prop_assert_eq!(contents(&a.clone().minus(&empty)), contents(&a));
        prop_assert_eq!(contents(&a.clone().union(empty.clone())), contents(&a));
    }

    #[test]
    fn minus_leaves_no_covered_time(a in arb_set(12), b in arb_set(12)) {
        let out = a.clone().minus(&b);
        for piece in &out {
            let origin = &a.intervals()[piece.payload];
            prop_assert!(origin.bounds.t.lo <= piece.t1() && piece.t2() <= origin.bounds.t.hi);
            prop_assert_eq!(piece.bounds.x, origin.bounds.x);
            for cut in &b {
                if cut.length() == 0.0 {
                    continue;
                }
                let shared = piece.t2().min(cut.t2()) - piece.t1().max(cut.t1());
                prop_assert!(shared <= 0.0, "piece {:?} overlaps cutter {:?}", piece.bounds, cut.bounds);
            }
        }
    }

    #[test]
    fn coalesce_never_loses_time(a in arb_set(15)) {
        let touching = Axis::T.meets_or_overlaps();
        let out = a.clone().coalesce(|x, y| touching.test(x, y), merge::first_payload);
        prop_assert!(out.len() <= a.len());
        // every input lies inside some output
        for i in &a {
            prop_assert!(out.iter().any(|o| o.bounds.encloses(&i.bounds)));
        }
    }
}
