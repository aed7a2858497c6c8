//! Constraint-based pattern matching within a set.
//!
//! A [`Pattern`] names variables and constrains them with unary and binary
//! tests. Matching assigns a distinct interval to every variable such that
//! all constraints hold, enumerating every solution by backtracking.

use std::collections::BTreeMap;

use super::IntervalSet;
use crate::model::Interval;

type UnaryFn<'f, P> = Box<dyn Fn(&Interval<P>) -> bool + 'f>;
type BinaryFn<'f, P> = Box<dyn Fn(&Interval<P>, &Interval<P>) -> bool + 'f>;

/// One solution: variable name to assigned interval.
pub type Match<'a, P> = BTreeMap<String, &'a Interval<P>>;

/// Named variables with the constraints they must satisfy.
pub struct Pattern<'f, P> {
    names: Vec<String>,
    unary: Vec<(usize, UnaryFn<'f, P>)>,
    binary: Vec<(usize, usize, BinaryFn<'f, P>)>,
}

impl<P> Default for Pattern<'_, P> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            unary: Vec::new(),
            binary: Vec::new(),
        }
    }
}

impl<'f, P> Pattern<'f, P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&mut self, name: &str) -> usize {
        match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    /// Declares a variable with no constraints of its own.
    pub fn variable(mut self, name: &str) -> Self {
        self.index_of(name);
        self
    }

    /// Constrains one variable.
    pub fn unary<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Interval<P>) -> bool + 'f,
    {
        let index = self.index_of(name);
        self.unary.push((index, Box::new(f)));
        self
    }

    /// Constrains a pair of variables; `f` receives them in the given order.
    pub fn binary<F>(mut self, first: &str, second: &str, f: F) -> Self
    where
        F: Fn(&Interval<P>, &Interval<P>) -> bool + 'f,
    {
        let a = self.index_of(first);
        let b = self.index_of(second);
        self.binary.push((a, b, Box::new(f)));
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.names
    }
}

struct Search<'s, 'a, 'f, P> {
    pattern: &'s Pattern<'f, P>,
    intervals: &'a [Interval<P>],
    candidates: Vec<Vec<usize>>,
    assigned: Vec<usize>,
    used: Vec<bool>,
    solutions: Vec<Match<'a, P>>,
}

impl<'a, P> Search<'_, 'a, '_, P> {
    fn consistent(&self, var: usize) -> bool {
        self.pattern.binary.iter().all(|(a, b, f)| {
            // checked once both ends are assigned, i.e. at the later one
            if (*a).max(*b) != var {
                return true;
            }
            f(
                &self.intervals[self.assigned[*a]],
                &self.intervals[self.assigned[*b]],
            )
        })
    }

    fn run(&mut self, var: usize) {
        if var == self.pattern.names.len() {
            let intervals = self.intervals;
            let solution = self
                .pattern
                .names
                .iter()
                .zip(&self.assigned)
                .map(|(name, &index)| (name.clone(), &intervals[index]))
                .collect();
            self.solutions.push(solution);
            return;
        }
        for slot in 0..self.candidates[var].len() {
            let index = self.candidates[var][slot];
            if self.used[index] {
                continue;
            }
            self.used[index] = true;
            self.assigned.push(index);
            if self.consistent(var) {
                self.run(var + 1);
            }
            self.assigned.pop();
            self.used[index] = false;
        }
    }
}

impl<P> IntervalSet<P> {
    /// Finds every assignment of distinct intervals to the pattern's
    /// variables satisfying all its constraints.
    ///
    /// With `exact`, the set must contain exactly as many intervals as the
    /// pattern has variables. An empty pattern never matches. Solutions are
    /// ordered by the sorted positions of the assigned intervals.
    pub fn match_pattern<'a>(&'a self, pattern: &Pattern<'_, P>, exact: bool) -> Vec<Match<'a, P>> {
        let intervals = self.intervals();
        let vars = pattern.names.len();
        if vars == 0 || (exact && intervals.len() != vars) {
            return Vec::new();
        }

        let mut candidates = Vec::with_capacity(vars);
        for var in 0..vars {
            let fits: Vec<usize> = (0..intervals.len())
                .filter(|&i| {
                    pattern
                        .unary
                        .iter()
                        .filter(|(v, _)| *v == var)
                        .all(|(_, f)| f(&intervals[i]))
                })
                .collect();
            if fits.is_empty() {
                return Vec::new();
            }
            candidates.push(fits);
        }

        let mut search = Search {
            pattern,
            intervals,
            candidates,
            assigned: Vec::with_capacity(vars),
            used: vec![false; intervals.len()],
            solutions: Vec::new(),
        };
        search.run(0);
        search.solutions
    }
}
