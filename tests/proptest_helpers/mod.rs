#![allow(dead_code)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use stalgebra::model::{Bounds, Interval};
use stalgebra::{IntervalSet, IntervalSetMapping};

/// Grid step for generated coordinates. Values are exact in binary, so
/// boundary cases (touching, equal endpoints) come up often and compare
/// exactly.
pub const STEP: f64 = 0.25;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

fn grid(lo: u32, hi: u32) -> BoxedStrategy<f64> {
    (lo..=hi).prop_map(|k| k as f64 * STEP).boxed()
}

/// Well-formed bounds: `t` within `[0, 20]`, spatial ranges within the frame.
pub fn arb_bounds() -> BoxedStrategy<Bounds> {
    (grid(0, 72), grid(0, 8), grid(0, 3), grid(0, 4), grid(0, 3), grid(0, 4))
        .prop_map(|(t1, len, x1, w, y1, h)| {
            Bounds::new(t1, t1 + len, x1, (x1 + w).min(1.0), y1, (y1 + h).min(1.0))
        })
        .boxed()
}

/// A set whose payload is each interval's sorted position, so outputs can
/// be traced back to `set.intervals()[payload]`.
pub fn arb_set(max_len: usize) -> BoxedStrategy<IntervalSet<usize>> {
    proptest::collection::vec(arb_bounds(), 0..=max_len)
        .prop_map(|mut bounds| {
            bounds.sort_by(|a, b| a.total_cmp(b));
            bounds
                .into_iter()
                .enumerate()
                .map(|(index, b)| Interval::new(b, index))
                .collect()
        })
        .boxed()
}

/// A mapping over a subset of the keys `0..max_keys`.
pub fn arb_mapping(max_keys: u8, max_len: usize) -> BoxedStrategy<IntervalSetMapping<u8, usize>> {
    proptest::collection::btree_map(0..max_keys, arb_set(max_len), 0..=max_keys as usize)
        .prop_map(IntervalSetMapping::from_map)
        .boxed()
}

/// Bounds and payload of every interval, in set order.
pub fn contents<P: Clone>(set: &IntervalSet<P>) -> Vec<(Bounds, P)> {
    set.iter().map(|i| (i.bounds, i.payload.clone())).collect()
}

/// Unwindowed reference: every pair accepted by `predicate`.
pub fn cross_product<P, Q, R, F, M>(
    left: &IntervalSet<P>,
    right: &IntervalSet<Q>,
    mut predicate: F,
    mut merge_op: M,
) -> IntervalSet<R>
where
    F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
    M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
{
    let mut output = Vec::new();
    for a in left {
        for b in right {
            if predicate(a, b) {
                output.push(merge_op(a, b));
            }
        }
    }
    IntervalSet::new(output)
}

/// Per-key sizes, for comparing mapping shapes.
pub fn shape<K: Ord + Clone, P>(mapping: &IntervalSetMapping<K, P>) -> BTreeMap<K, usize> {
    mapping.size()
}
