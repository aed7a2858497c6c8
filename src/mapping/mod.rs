//! Keyed collections of interval sets.
//!
//! [`IntervalSetMapping`] lifts every [`IntervalSet`] operation across keys
//! (typically one key per video). Unary operations keep the key set as-is,
//! even when a key's set becomes empty. Binary operations differ:
//!
//! - `join` and its variants keep only keys present on both sides;
//! - `union` keeps keys from either side;
//! - `minus` keeps the receiver's keys, passing through keys the other side
//!   lacks.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{BoxError, StalgebraError};
use crate::model::Interval;
use crate::predicate::BoundsPredicate;
use crate::set::{IntervalSet, Match, Pattern};

/// A mapping from key to [`IntervalSet`], iterated in key order.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct IntervalSetMapping<K: Ord, P> {
    sets: BTreeMap<K, IntervalSet<P>>,
}

impl<K: Ord, P> Default for IntervalSetMapping<K, P> {
    fn default() -> Self {
        Self {
            sets: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, P> IntervalSetMapping<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(sets: BTreeMap<K, IntervalSet<P>>) -> Self {
        Self { sets }
    }

    /// Builds a mapping from raw rows, deriving each row's key and interval.
    pub fn from_iterable<T, I, KF, IF>(rows: I, mut key_fn: KF, mut interval_fn: IF) -> Self
    where
        I: IntoIterator<Item = T>,
        KF: FnMut(&T) -> K,
        IF: FnMut(T) -> Interval<P>,
    {
        let mut buckets: BTreeMap<K, Vec<Interval<P>>> = BTreeMap::new();
        for row in rows {
            let key = key_fn(&row);
            buckets.entry(key).or_default().push(interval_fn(row));
        }
        Self::from_buckets(buckets)
    }

    /// Splits a set by key. Each resulting set keeps the input's order.
    pub fn from_set<KF>(set: IntervalSet<P>, mut key_fn: KF) -> Self
    where
        KF: FnMut(&Interval<P>) -> K,
    {
        let mut buckets: BTreeMap<K, Vec<Interval<P>>> = BTreeMap::new();
        for interval in set {
            buckets.entry(key_fn(&interval)).or_default().push(interval);
        }
        Self::from_buckets(buckets)
    }

    fn from_buckets(buckets: BTreeMap<K, Vec<Interval<P>>>) -> Self {
        let sets = buckets
            .into_iter()
            .map(|(key, intervals)| (key, IntervalSet::new(intervals)))
            .collect();
        Self { sets }
    }

    pub fn insert(&mut self, key: K, set: IntervalSet<P>) -> Option<IntervalSet<P>> {
        self.sets.insert(key, set)
    }

    pub fn get(&self, key: &K) -> Option<&IntervalSet<P>> {
        self.sets.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.sets.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.sets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &IntervalSet<P>)> {
        self.sets.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Read-only view: key to intervals in canonical sorted order.
    pub fn grouped_intervals(&self) -> &BTreeMap<K, IntervalSet<P>> {
        &self.sets
    }

    pub fn into_inner(self) -> BTreeMap<K, IntervalSet<P>> {
        self.sets
    }

    /// Interval count per key.
    pub fn size(&self) -> BTreeMap<K, usize> {
        self.sets
            .iter()
            .map(|(key, set)| (key.clone(), set.len()))
            .collect()
    }

    /// Interval count over all keys.
    pub fn total_len(&self) -> usize {
        self.sets.values().map(IntervalSet::len).sum()
    }

    /// Drops keys whose set is empty.
    pub fn without_empty(self) -> Self {
        let sets = self
            .sets
            .into_iter()
            .filter(|(_, set)| !set.is_empty())
            .collect();
        Self { sets }
    }

    /// Applies `f` to every (key, set) pair, keeping the key set.
    pub fn map_sets<Q, F>(self, mut f: F) -> IntervalSetMapping<K, Q>
    where
        F: FnMut(&K, IntervalSet<P>) -> IntervalSet<Q>,
    {
        let sets = self
            .sets
            .into_iter()
            .map(|(key, set)| {
                let out = f(&key, set);
                (key, out)
            })
            .collect();
        IntervalSetMapping { sets }
    }

    /// Fallible [`map_sets`](Self::map_sets); the first error aborts.
    pub fn try_map_sets<Q, F>(self, mut f: F) -> Result<IntervalSetMapping<K, Q>, StalgebraError>
    where
        F: FnMut(&K, IntervalSet<P>) -> Result<IntervalSet<Q>, StalgebraError>,
    {
        let mut sets = BTreeMap::new();
        for (key, set) in self.sets {
            let out = f(&key, set)?;
            sets.insert(key, out);
        }
        Ok(IntervalSetMapping { sets })
    }

    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&Interval<P>) -> bool,
    {
        self.map_sets(|_, set| set.filter(&mut predicate))
    }

    pub fn map<Q, F>(self, mut f: F) -> IntervalSetMapping<K, Q>
    where
        F: FnMut(Interval<P>) -> Interval<Q>,
    {
        self.map_sets(|_, set| set.map(&mut f))
    }

    pub fn map_payload<Q, F>(self, mut f: F) -> IntervalSetMapping<K, Q>
    where
        F: FnMut(P) -> Q,
    {
        self.map_sets(|_, set| set.map_payload(&mut f))
    }

    pub fn filter_size(self, min: f64, max: Option<f64>) -> Self {
        self.map_sets(|_, set| set.filter_size(min, max))
    }

    pub fn dilate(self, window: f64) -> Self {
        self.map_sets(|_, set| set.dilate(window))
    }

    pub fn expand_to_frame(self) -> Self {
        self.map_sets(|_, set| set.expand_to_frame())
    }

    pub fn coalesce<F, M>(self, mut predicate: F, mut merge_op: M) -> Self
    where
        F: FnMut(&Interval<P>, &Interval<P>) -> bool,
        M: FnMut(&P, &P) -> P,
    {
        self.map_sets(|_, set| set.coalesce(&mut predicate, &mut merge_op))
    }

    pub fn coalesce_within<F, M>(self, mut predicate: F, mut merge_op: M, epsilon: f64) -> Self
    where
        F: FnMut(&Interval<P>, &Interval<P>) -> bool,
        M: FnMut(&P, &P) -> P,
    {
        self.map_sets(|_, set| set.coalesce_within(&mut predicate, &mut merge_op, epsilon))
    }

    pub fn group_by<G, R, KF, M>(self, mut key_fn: KF, mut merge_op: M) -> IntervalSetMapping<K, R>
    where
        G: Ord,
        KF: FnMut(&Interval<P>) -> G,
        M: FnMut(&G, IntervalSet<P>) -> Interval<R>,
    {
        self.map_sets(|_, set| set.group_by(&mut key_fn, &mut merge_op))
    }

    /// Folds over every (key, set) pair in key order.
    pub fn fold<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, (&K, &IntervalSet<P>)) -> A,
    {
        self.sets.iter().fold(init, f)
    }

    /// Folds each key's set with its own accumulator.
    pub fn fold_each<A, F>(&self, init: A, mut f: F) -> BTreeMap<K, A>
    where
        A: Clone,
        F: FnMut(A, &Interval<P>) -> A,
    {
        self.sets
            .iter()
            .map(|(key, set)| (key.clone(), set.fold(init.clone(), &mut f)))
            .collect()
    }

    /// Per-key fold in a custom interval order.
    pub fn fold_each_by<A, C, F>(&self, mut cmp: C, init: A, mut f: F) -> BTreeMap<K, A>
    where
        A: Clone,
        C: FnMut(&Interval<P>, &Interval<P>) -> Ordering,
        F: FnMut(A, &Interval<P>) -> A,
    {
        self.sets
            .iter()
            .map(|(key, set)| (key.clone(), set.fold_by(&mut cmp, init.clone(), &mut f)))
            .collect()
    }

    /// Pattern matches per key; keys without solutions map to an empty list.
    pub fn match_pattern<'a>(&'a self, pattern: &Pattern<'_, P>, exact: bool) -> BTreeMap<K, Vec<Match<'a, P>>> {
        self.sets
            .iter()
            .map(|(key, set)| (key.clone(), set.match_pattern(pattern, exact)))
            .collect()
    }

    /// Tags every payload with its key.
    pub fn add_key_to_payload(self) -> IntervalSetMapping<K, (P, K)> {
        self.map_sets(|key, set| set.map_payload(|p| (p, key.clone())))
    }

    /// All intervals of all keys in one sorted set.
    pub fn flatten(self) -> IntervalSet<P> {
        let intervals: Vec<Interval<P>> = self
            .sets
            .into_values()
            .flat_map(IntervalSet::into_intervals)
            .collect();
        IntervalSet::new(intervals)
    }

    /// Keys present on both sides, in order.
    pub fn shared_keys<'a, Q>(&'a self, other: &'a IntervalSetMapping<K, Q>) -> impl Iterator<Item = &'a K> {
        self.sets.keys().filter(move |key| other.sets.contains_key(*key))
    }

    /// Fails with [`StalgebraError::KeyMismatch`] when the two mappings
    /// share no key. Joins never call this themselves: an empty join result
    /// is valid.
    pub fn require_shared_keys<Q>(&self, other: &IntervalSetMapping<K, Q>) -> Result<(), StalgebraError> {
        if self.shared_keys(other).next().is_some() {
            return Ok(());
        }
        Err(StalgebraError::KeyMismatch(format!(
            "no shared keys between operands ({} key(s) vs {} key(s))",
            self.len(),
            other.len()
        )))
    }

    /// Per-key windowed join over the shared keys.
    pub fn join<Q, R, F, M>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> IntervalSetMapping<K, R>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
        M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
    {
        let mut sets = BTreeMap::new();
        for (key, left) in &self.sets {
            let Some(right) = other.sets.get(key) else {
                continue;
            };
            let joined = left.join(right, &mut predicate, &mut merge_op, window);
            sets.insert(key.clone(), joined);
        }
        IntervalSetMapping { sets }
    }

    pub fn flat_join<Q, R, F, M, I>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> IntervalSetMapping<K, R>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
        M: FnMut(&Interval<P>, &Interval<Q>) -> I,
        I: IntoIterator<Item = Interval<R>>,
    {
        let mut sets = BTreeMap::new();
        for (key, left) in &self.sets {
            if let Some(right) = other.sets.get(key) {
                let joined = left.flat_join(right, &mut predicate, &mut merge_op, window);
                sets.insert(key.clone(), joined);
            }
        }
        IntervalSetMapping { sets }
    }

    /// Fallible join; the first failure on any key aborts the whole result.
    pub fn try_join<Q, R, F, M, EP, EM>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        mut predicate: F,
        mut merge_op: M,
        window: f64,
    ) -> Result<IntervalSetMapping<K, R>, StalgebraError>
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> Result<bool, EP>,
        M: FnMut(&Interval<P>, &Interval<Q>) -> Result<Interval<R>, EM>,
        EP: Into<BoxError>,
        EM: Into<BoxError>,
    {
        let mut sets = BTreeMap::new();
        for (key, left) in &self.sets {
            if let Some(right) = other.sets.get(key) {
                let joined = left.try_join(right, &mut predicate, &mut merge_op, window)?;
                sets.insert(key.clone(), joined);
            }
        }
        Ok(IntervalSetMapping { sets })
    }

    /// Join on a [`BoundsPredicate`] with a window derived per key.
    pub fn join_on<Q, R, M>(
        &self,
        other: &IntervalSetMapping<K, Q>,
        predicate: &BoundsPredicate,
        mut merge_op: M,
    ) -> IntervalSetMapping<K, R>
    where
        M: FnMut(&Interval<P>, &Interval<Q>) -> Interval<R>,
    {
        let mut sets = BTreeMap::new();
        for (key, left) in &self.sets {
            if let Some(right) = other.sets.get(key) {
                sets.insert(key.clone(), left.join_on(right, predicate, &mut merge_op));
            }
        }
        IntervalSetMapping { sets }
    }

    /// Per-key [`IntervalSet::filter_against`]. Keys missing from `other`
    /// keep an empty set, since nothing there can satisfy the predicate.
    pub fn filter_against<Q, F>(
        self,
        other: &IntervalSetMapping<K, Q>,
        mut predicate: F,
        window: f64,
    ) -> Self
    where
        F: FnMut(&Interval<P>, &Interval<Q>) -> bool,
    {
        self.map_sets(|key, set| match other.sets.get(key) {
            Some(right) => set.filter_against(right, &mut predicate, window),
            None => IntervalSet::empty(),
        })
    }

    /// Multiset union per key over the union of keys.
    pub fn union(self, other: IntervalSetMapping<K, P>) -> Self {
        let mut sets = self.sets;
        for (key, set) in other.sets {
            let merged = match sets.remove(&key) {
                Some(existing) => existing.union(set),
                None => set,
            };
            sets.insert(key, merged);
        }
        Self { sets }
    }

    /// Per-key temporal difference over the receiver's keys.
    pub fn minus<Q>(self, other: &IntervalSetMapping<K, Q>) -> Self
    where
        P: Clone,
    {
        self.map_sets(|key, set| match other.sets.get(key) {
            Some(right) => set.minus(right),
            None => set,
        })
    }
}

impl<K: Ord + Clone, P> FromIterator<(K, IntervalSet<P>)> for IntervalSetMapping<K, P> {
    fn from_iter<I: IntoIterator<Item = (K, IntervalSet<P>)>>(iter: I) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, P> IntoIterator for IntervalSetMapping<K, P> {
    type Item = (K, IntervalSet<P>);
    type IntoIter = std::collections::btree_map::IntoIter<K, IntervalSet<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, Bounds};

    type Row = (&'static str, f64, f64, u32);

    fn mapping(rows: &[Row]) -> IntervalSetMapping<String, u32> {
        IntervalSetMapping::from_iterable(
            rows.iter().copied(),
            |row| row.0.to_string(),
            |(_, t1, t2, p)| Interval::new(Bounds::temporal(t1, t2), p),
        )
    }

    fn keys<P>(m: &IntervalSetMapping<String, P>) -> Vec<&str> {
        m.keys().map(String::as_str).collect()
    }

    #[test]
    fn from_iterable_groups_and_sorts() {
        let m = mapping(&[("b", 3.0, 4.0, 1), ("a", 1.0, 2.0, 2), ("b", 0.0, 1.0, 3)]);
        assert_eq!(keys(&m), ["a", "b"]);
        let b = m.get(&"b".to_string()).unwrap();
        assert_eq!(b.intervals()[0].payload, 3);
        assert_eq!(m.size()["b"], 2);
        assert_eq!(m.total_len(), 3);
    }

    #[test]
    fn unary_ops_keep_empty_keys() {
        let m = mapping(&[("a", 0.0, 1.0, 1), ("b", 0.0, 5.0, 2)]);
        let long = m.filter(|i| i.length() > 2.0);
        assert_eq!(keys(&long), ["a", "b"]);
        assert!(long.get(&"a".to_string()).unwrap().is_empty());
        assert_eq!(keys(&long.without_empty()), ["b"]);
    }

    #[test]
    fn join_keeps_only_shared_keys() {
        let left = mapping(&[("a", 0.0, 1.0, 1), ("b", 0.0, 1.0, 2)]);
        let right = mapping(&[("b", 0.5, 1.5, 3), ("c", 0.0, 1.0, 4)]);
        let joined = left.join(
            &right,
            |a, b| Axis::T.overlaps().test(a, b),
            |a, b| a.span_merge(b, |p, q| p + q),
            0.0,
        );
        assert_eq!(keys(&joined), ["b"]);
        let only = &joined.get(&"b".to_string()).unwrap().intervals()[0];
        assert_eq!(only.payload, 5);
        assert_eq!(only.bounds.t.as_tuple(), (0.0, 1.5));
        assert!(left.require_shared_keys(&right).is_ok());
    }

    #[test]
    fn require_shared_keys_reports_mismatch() {
        let left = mapping(&[("a", 0.0, 1.0, 1)]);
        let right = mapping(&[("b", 0.0, 1.0, 1)]);
        assert!(matches!(
            left.require_shared_keys(&right),
            Err(StalgebraError::KeyMismatch(_))
        ));
        assert!(left.join(&right, |_, _| true, |a, _| a.clone(), 10.0).is_empty());
    }

    #[test]
    fn union_and_minus_key_sets() {
        let left = mapping(&[("a", 0.0, 10.0, 1), ("b", 0.0, 1.0, 2)]);
        let right = mapping(&[("a", 2.0, 3.0, 9), ("c", 0.0, 1.0, 4)]);

        let diff = left.clone().minus(&right);
        assert_eq!(keys(&diff), ["a", "b"]);
        assert_eq!(diff.size()["a"], 2);
        assert_eq!(diff.size()["b"], 1);

        let both = left.union(right);
        assert_eq!(keys(&both), ["a", "b", "c"]);
        assert_eq!(both.size()["a"], 2);
    }

    #[test]
    fn add_key_and_flatten() {
        let m = mapping(&[("a", 1.0, 2.0, 1), ("b", 0.0, 1.0, 2)]);
        let flat = m.add_key_to_payload().flatten();
        let tagged: Vec<_> = flat.iter().map(|i| i.payload.clone()).collect();
        assert_eq!(tagged, [(2, "b".to_string()), (1, "a".to_string())]);
    }

    #[test]
    fn from_set_round_trips_through_flatten() {
        let set = IntervalSet::new(vec![
            Interval::new(Bounds::temporal(0.0, 1.0), 1u32),
            Interval::new(Bounds::temporal(2.0, 3.0), 2),
            Interval::new(Bounds::temporal(4.0, 5.0), 1),
        ]);
        let by_payload = set.clone().group_into_mapping(|i| i.payload);
        assert_eq!(by_payload.size()[&1], 2);
        assert_eq!(by_payload.flatten().intervals(), set.intervals());
    }

    #[test]
    fn fold_each_counts_time() {
        let m = mapping(&[("a", 0.0, 1.0, 1), ("a", 2.0, 4.0, 1)]);
        let totals = m.fold_each(0.0, |acc, i| acc + i.length());
        assert_eq!(totals["a"], 3.0);
        let keys_seen = m.fold(0, |n, _| n + 1);
        assert_eq!(keys_seen, 1);
    }
}
