//! Parallel query execution using rayon.
//!
//! Keys of an [`IntervalSetMapping`] are independent, so per-key work can
//! run on a thread pool with no coordination beyond collecting results.
//! [`Runtime::run`] goes one step further and executes a whole query over
//! chunks of its arguments (e.g. video ids), combining the partial mappings.
//!
//! Results never depend on scheduling: chunk results are combined in chunk
//! order, whatever order the pool ran them in.

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::error::StalgebraError;
use crate::mapping::IntervalSetMapping;
use crate::set::IntervalSet;

/// What to do when a chunk fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole run with the first error (in chunk order).
    #[default]
    Abort,
    /// Record the failed chunk's arguments and keep going.
    Collect,
}

/// How partial results from different chunks are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combiner {
    /// Per-key multiset union.
    #[default]
    Union,
    /// Chunks must produce disjoint keys; overlap is a
    /// [`StalgebraError::KeyMismatch`].
    Disjoint,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (0 = auto-detect, 1 = run inline)
    pub num_threads: usize,
    /// Arguments handed to each query invocation
    pub chunk_size: usize,
    /// Shuffle chunk execution order
    pub randomize: bool,
    /// Seed for the shuffle; `None` draws from the thread RNG
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            num_threads: 0,
            chunk_size: 1,
            randomize: true,
            seed: None,
            failure_policy: FailurePolicy::Abort,
        }
    }

    /// Single-threaded, unshuffled.
    pub fn sequential() -> Self {
        Self {
            num_threads: 1,
            randomize: false,
            ..Self::new()
        }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Self::new()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of [`Runtime::run`].
#[derive(Debug)]
pub struct RunOutput<K: Ord, P, A> {
    pub result: IntervalSetMapping<K, P>,
    /// Arguments of failed chunks; only populated under
    /// [`FailurePolicy::Collect`].
    pub failed: Vec<A>,
}

/// Executes per-key work and chunked queries on a rayon pool.
pub struct Runtime {
    config: RuntimeConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Runtime {
    /// Creates a runtime, building a dedicated pool unless the config asks
    /// for a single thread.
    pub fn new(config: RuntimeConfig) -> Result<Self, StalgebraError> {
        let pool = if config.num_threads == 1 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build()
                .map_err(|e| StalgebraError::ThreadPool(e.to_string()))?;
            Some(pool)
        };
        Ok(Self { config, pool })
    }

    /// A runtime that runs everything on the calling thread.
    pub fn inline() -> Self {
        Self {
            config: RuntimeConfig::sequential(),
            pool: None,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Worker count actually in use.
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, rayon::ThreadPool::current_num_threads)
    }

    fn execute<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
            None => items.into_iter().map(f).collect(),
        }
    }

    /// Applies `f` to every key's set in parallel.
    ///
    /// The key set is preserved. If any key fails, the error for the first
    /// failing key (in key order) is returned and no partial result is kept.
    pub fn map_keys<K, P, Q, F>(
        &self,
        mapping: IntervalSetMapping<K, P>,
        f: F,
    ) -> Result<IntervalSetMapping<K, Q>, StalgebraError>
    where
        K: Ord + Clone + Send,
        P: Send,
        Q: Send,
        F: Fn(&K, IntervalSet<P>) -> Result<IntervalSet<Q>, StalgebraError> + Sync + Send,
    {
        let entries: Vec<(K, IntervalSet<P>)> = mapping.into_iter().collect();
        let results = self.execute(entries, |(key, set)| {
            let out = f(&key, set);
            (key, out)
        });
        results
            .into_iter()
            .map(|(key, out)| out.map(|set| (key, set)))
            .collect()
    }

    /// Runs `query` over `args` split into chunks and combines the results.
    ///
    /// With [`FailurePolicy::Collect`], failed chunks are logged and their
    /// arguments returned in [`RunOutput::failed`]; the run only fails if
    /// every chunk did.
    pub fn run<A, K, P, Q>(
        &self,
        query: Q,
        args: Vec<A>,
        combiner: Combiner,
    ) -> Result<RunOutput<K, P, A>, StalgebraError>
    where
        A: Send + Sync,
        K: Ord + Clone + Send + std::fmt::Debug,
        P: Send,
        Q: Fn(&[A]) -> Result<IntervalSetMapping<K, P>, StalgebraError> + Sync + Send,
    {
        let chunks = self.plan(args);
        let total = chunks.len();
        log::debug!(
            "runtime: {} chunk(s) on {} thread(s)",
            total,
            self.threads()
        );

        let mut outcomes = self.execute(chunks, |(index, chunk)| {
            let out = query(&chunk);
            (index, chunk, out)
        });
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut result: Option<IntervalSetMapping<K, P>> = None;
        let mut failed = Vec::new();
        let mut failed_chunks = 0;
        for (index, chunk, out) in outcomes {
            let partial = match out {
                Ok(partial) => partial,
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Collect => {
                        log::warn!("runtime: chunk {} failed: {}", index, err);
                        failed_chunks += 1;
                        failed.extend(chunk);
                        continue;
                    }
                },
            };
            result = Some(match result {
                None => partial,
                Some(acc) => combine(acc, partial, combiner)?,
            });
        }

        if total > 0 && failed_chunks == total {
            return Err(StalgebraError::AllTasksFailed {
                failed: failed_chunks,
            });
        }
        Ok(RunOutput {
            result: result.unwrap_or_default(),
            failed,
        })
    }

    /// Splits `args` into indexed chunks, shuffled if configured.
    fn plan<A>(&self, args: Vec<A>) -> Vec<(usize, Vec<A>)> {
        let size = self.config.chunk_size.max(1);
        let mut chunks = Vec::with_capacity(args.len().div_ceil(size));
        let mut current = Vec::with_capacity(size);
        for arg in args {
            current.push(arg);
            if current.len() == size {
                chunks.push((chunks.len(), std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            chunks.push((chunks.len(), current));
        }

        if self.config.randomize {
            if let Some(seed) = self.config.seed {
                let mut rng = StdRng::seed_from_u64(seed);
                chunks.shuffle(&mut rng);
            } else {
                let mut rng = rand::rng();
                chunks.shuffle(&mut rng);
            }
        }
        chunks
    }
}

fn combine<K, P>(
    acc: IntervalSetMapping<K, P>,
    partial: IntervalSetMapping<K, P>,
    combiner: Combiner,
) -> Result<IntervalSetMapping<K, P>, StalgebraError>
where
    K: Ord + Clone + std::fmt::Debug,
{
    match combiner {
        Combiner::Union => Ok(acc.union(partial)),
        Combiner::Disjoint => {
            let overlap: Vec<&K> = acc.shared_keys(&partial).collect();
            if !overlap.is_empty() {
                return Err(StalgebraError::KeyMismatch(format!(
                    "disjoint combiner got overlapping keys {:?}",
                    overlap
                )));
            }
            let mut sets = acc.into_inner();
            sets.extend(partial);
            Ok(IntervalSetMapping::from_map(sets))
        }
    }
}
