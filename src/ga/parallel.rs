//! Batch operations fanned out over rayon.
//!
//! Each batch borrows its inputs immutably and returns freshly built
//! results, so workers never share mutable state. The collect at the end of
//! each batch is the only synchronization point.
//!
//! - [`evaluate_costs`]: fitness of every chromosome, ranked into a [`CostTable`]
//! - [`cross_batch`]: two children per parent pair
//! - [`mutate_batch`]: one mutant per task

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::epidemic::Population;

use super::chromosome::Chromosome;
use super::policy::Policy;
use super::types::{ChromosomeId, Cost};

/// Chromosomes ranked by cost, invalid ones included.
///
/// Invalid chromosomes are ranked at the sentinel cost given to
/// [`evaluate_costs`], so they sort as the worst tier while remaining
/// identifiable through [`invalid`](Self::invalid). Chromosomes of equal
/// cost are kept in handle order.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    ranking: BTreeMap<usize, Vec<ChromosomeId>>,
    costs: BTreeMap<ChromosomeId, Cost>,
    invalid: BTreeSet<ChromosomeId>,
}

impl CostTable {
    fn record(&mut self, id: ChromosomeId, cost: Cost, sentinel: usize) {
        if let Some(previous) = self.costs.insert(id, cost) {
            self.unrank(id, previous, sentinel);
        }
        match cost {
            Some(c) => {
                self.invalid.remove(&id);
                self.ranking.entry(c).or_default().push(id);
            }
            None => {
                self.invalid.insert(id);
                self.ranking.entry(sentinel).or_default().push(id);
            }
        }
        if let Some(bucket) = self.ranking.get_mut(&cost.unwrap_or(sentinel)) {
            bucket.sort_unstable();
        }
    }

    fn unrank(&mut self, id: ChromosomeId, cost: Cost, sentinel: usize) {
        let key = cost.unwrap_or(sentinel);
        if let Some(bucket) = self.ranking.get_mut(&key) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                self.ranking.remove(&key);
            }
        }
        self.invalid.remove(&id);
    }

    /// Number of ranked chromosomes.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Whether nothing is ranked.
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Cost → chromosomes, invalid ones under the sentinel.
    pub fn ranking(&self) -> &BTreeMap<usize, Vec<ChromosomeId>> {
        &self.ranking
    }

    /// Chromosomes whose epidemic exceeded the limit.
    pub fn invalid(&self) -> &BTreeSet<ChromosomeId> {
        &self.invalid
    }

    /// Evaluated cost of `id`; `None` if `id` was never ranked.
    pub fn cost_of(&self, id: ChromosomeId) -> Option<Cost> {
        self.costs.get(&id).copied()
    }

    /// Handles from the highest cost down.
    ///
    /// Within a cost, handles outside `fresh` come first, then those in
    /// `fresh`; each group in descending handle order.
    pub fn worst_first<'s>(
        &'s self,
        fresh: &'s BTreeSet<ChromosomeId>,
    ) -> impl Iterator<Item = ChromosomeId> + 's {
        self.ranking.values().rev().flat_map(move |bucket| {
            let (newer, older): (Vec<_>, Vec<_>) =
                bucket.iter().rev().copied().partition(|id| fresh.contains(id));
            older.into_iter().chain(newer)
        })
    }

    /// The lowest-cost valid chromosome.
    pub fn best_valid(&self) -> Option<(usize, ChromosomeId)> {
        self.ranking
            .iter()
            .flat_map(|(&cost, bucket)| bucket.iter().map(move |&id| (cost, id)))
            .find(|(_, id)| !self.invalid.contains(id))
    }

    /// Drops `id` from the table.
    pub fn forget(&mut self, id: ChromosomeId, sentinel: usize) {
        if let Some(cost) = self.costs.remove(&id) {
            self.unrank(id, cost, sentinel);
        }
    }

    /// Folds `other` into this table; entries of `other` win on conflict.
    pub fn merge(&mut self, other: CostTable, sentinel: usize) {
        for (id, cost) in other.costs {
            self.record(id, cost, sentinel);
        }
    }
}

/// Evaluates every chromosome of `batch` and ranks the results.
///
/// Invalid chromosomes are ranked at `sentinel`.
pub fn evaluate_costs(
    batch: &[(ChromosomeId, &Chromosome)],
    population: &Population,
    virality: usize,
    sentinel: usize,
    parallel: bool,
) -> CostTable {
    let evaluate = |&(id, chromosome): &(ChromosomeId, &Chromosome)| {
        (id, chromosome.cost(population, virality))
    };

    let results: Vec<(ChromosomeId, Cost)> = if parallel {
        batch.par_iter().map(evaluate).collect()
    } else {
        batch.iter().map(evaluate).collect()
    };

    let mut table = CostTable::default();
    for (id, cost) in results {
        table.record(id, cost, sentinel);
    }
    table
}

/// A pair of parents to recombine, with the policy the worker draws from.
#[derive(Debug)]
pub struct CrossTask<'a, P> {
    pub first: &'a Chromosome,
    pub second: &'a Chromosome,
    pub policy: P,
}

/// Crosses every pair, returning both children of each in task order.
pub fn cross_batch<'a, P: Policy>(tasks: Vec<CrossTask<'a, P>>, parallel: bool) -> Vec<Chromosome> {
    let cross = |mut task: CrossTask<'a, P>| {
        let (a, b) = task.first.cross(task.second, &mut task.policy);
        [a, b]
    };

    if parallel {
        tasks.into_par_iter().flat_map_iter(cross).collect()
    } else {
        tasks.into_iter().flat_map(cross).collect()
    }
}

/// A parent to mutate and the magnitudes of its mutation.
#[derive(Debug)]
pub struct MutationTask<'a, P> {
    pub parent: &'a Chromosome,
    pub add: usize,
    pub remove: usize,
    pub update: usize,
    pub policy: P,
}

/// Mutates every parent, returning one mutant per task in task order.
pub fn mutate_batch<'a, P: Policy>(
    tasks: Vec<MutationTask<'a, P>>,
    population: &Population,
    parallel: bool,
) -> Vec<Chromosome> {
    let mutate = |mut task: MutationTask<'a, P>| {
        task.parent
            .mutate(task.add, task.remove, task.update, population, &mut task.policy)
    };

    if parallel {
        tasks.into_par_iter().map(mutate).collect()
    } else {
        tasks.into_iter().map(mutate).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
