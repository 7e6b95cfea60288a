//! Parameter and randomness policy.
//!
//! Every random choice and every tunable of the search goes through
//! [`Policy`], so a run can be reproduced from a seed and tests can script
//! the exact choices made.
//!
//! The driver owns one policy and draws from it on its own thread only.
//! Batch workers never share it: each task receives a [`Policy::fork`]
//! that it owns for the task's duration.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::IsolationConfig;

/// Source of tunables and random choices for the isolation search.
///
/// Implementors provide the three primitive operations and the
/// configuration; everything else has a default built on them and may be
/// overridden.
pub trait Policy: Send {
    /// The configuration backing the tunables.
    fn config(&self) -> &IsolationConfig;

    /// A fair coin flip.
    fn binary_random(&mut self) -> bool;

    /// A uniform integer in `[0, upper]`.
    fn random_to(&mut self, upper: usize) -> usize;

    /// Derives an independent policy for a batch worker task.
    ///
    /// Forking advances `self`, so the children of a seeded policy are
    /// reproducible too.
    fn fork(&mut self) -> Self
    where
        Self: Sized;

    /// Two distinct uniform integers in `[0, max]`.
    ///
    /// # Panics
    /// Panics if `max == 0` (no distinct pair exists).
    fn random_pair(&mut self, max: usize) -> (usize, usize) {
        assert!(max > 0, "a distinct pair needs at least two candidates");
        loop {
            let i = self.random_to(max);
            let j = self.random_to(max);
            if i != j {
                return (i, j);
            }
        }
    }

    /// A uniformly chosen element of `items`.
    ///
    /// # Panics
    /// Panics if `items` is empty.
    fn random_from<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot pick from an empty sequence");
        &items[self.random_to(items.len() - 1)]
    }

    /// Epidemic virality threshold.
    fn virality(&self) -> usize {
        self.config().virality
    }

    /// Fraction of relations isolated by a random chromosome.
    fn initial_isolation_factor(&self) -> f64 {
        self.config().initial_isolation_factor
    }

    /// Live population size after pruning.
    fn target_population(&self) -> usize {
        self.config().target_population
    }

    /// Crossovers per generation.
    fn cross_count(&self) -> usize {
        self.config().cross_count
    }

    /// Mutations per generation.
    fn mutation_count(&self) -> usize {
        self.config().mutation_count
    }

    /// Bound of each regular mutation count.
    fn mutation_max(&self) -> usize {
        self.config().mutation_max
    }

    /// Bound of the isolations added by a repair.
    fn repair_max(&self) -> usize {
        self.config().repair_max
    }
}

/// Production policy backed by a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededPolicy {
    config: Arc<IsolationConfig>,
    rng: StdRng,
}

impl SeededPolicy {
    /// Creates a policy seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: IsolationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        Self {
            config: Arc::new(config),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for SeededPolicy {
    fn config(&self) -> &IsolationConfig {
        &self.config
    }

    fn binary_random(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn random_to(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..=upper)
    }

    fn fork(&mut self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            rng: StdRng::seed_from_u64(self.rng.random()),
        }
    }
}

/// Deterministic policy replaying scripted choices, for tests.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;

    /// Replays `coins` and `numbers` cyclically. A scripted number larger than
    /// the requested bound wraps modulo `upper + 1`. Forks replay the same
    /// script from the start.
    #[derive(Debug, Clone)]
    pub(crate) struct ScriptedPolicy {
        config: IsolationConfig,
        coins: Vec<bool>,
        numbers: Vec<usize>,
        coin_at: usize,
        number_at: usize,
    }

    impl ScriptedPolicy {
        pub(crate) fn new(config: IsolationConfig, coins: Vec<bool>, numbers: Vec<usize>) -> Self {
            assert!(!coins.is_empty() && !numbers.is_empty());
            Self {
                config,
                coins,
                numbers,
                coin_at: 0,
                number_at: 0,
            }
        }
    }

    impl Policy for ScriptedPolicy {
        fn config(&self) -> &IsolationConfig {
            &self.config
        }

        fn binary_random(&mut self) -> bool {
            let coin = self.coins[self.coin_at % self.coins.len()];
            self.coin_at += 1;
            coin
        }

        fn random_to(&mut self, upper: usize) -> usize {
            let n = self.numbers[self.number_at % self.numbers.len()];
            self.number_at += 1;
            n % (upper + 1)
        }

        fn fork(&mut self) -> Self {
            Self::new(self.config.clone(), self.coins.clone(), self.numbers.clone())
        }
    }
}
