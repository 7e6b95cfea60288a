//! Value types exchanged between the driver, the batches and callers.

use std::fmt;
use std::time::Duration;

use crate::epidemic::Isolations;

/// Fitness of a chromosome: the number of isolations, lower is better.
///
/// `None` marks an invalid chromosome whose epidemic still exceeds half the
/// population.
pub type Cost = Option<usize>;

/// Stable handle of a chromosome inside a [`ChromosomePool`](super::ChromosomePool).
///
/// Handles of evicted chromosomes may be reused by later insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChromosomeId(pub(crate) usize);

impl ChromosomeId {
    /// Slot index in the pool.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChromosomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A valid isolation set together with its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Number of isolations.
    pub cost: usize,
    /// The severed relations.
    pub isolations: Isolations,
}

/// Emitted each time the driver finds a strictly better solution.
///
/// Carries everything a presentation layer may want to print: the cost
/// alone, the cost with elapsed time, or the full isolation list.
#[derive(Debug, Clone)]
pub struct Progress<'a> {
    /// Generation (1-based) that produced the solution.
    pub generation: usize,
    /// Time since the run started.
    pub elapsed: Duration,
    /// The new best solution.
    pub solution: &'a Solution,
}
