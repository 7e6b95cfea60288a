//! Candidate isolation sets and their genetic operators.
//!
//! A [`Chromosome`] is nothing more than its isolation set. The canonical
//! [`Population`] and the [`Policy`] are borrowed by each operation, never
//! stored, so chromosomes can be moved freely between the pool and the batch
//! workers.

use crate::epidemic::{Isolations, Population, Relation};

use super::policy::Policy;
use super::types::Cost;

/// Infected percentage above which an isolation set is rejected.
pub const EPIDEMIC_LIMIT_PERCENT: f64 = 50.0;

/// A candidate solution: the set of relations to sever.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chromosome {
    isolations: Isolations,
}

impl Chromosome {
    /// Wraps an existing isolation set.
    pub fn new(isolations: Isolations) -> Self {
        Self { isolations }
    }

    /// Samples a random chromosome isolating
    /// `round(relations × initial_isolation_factor)` distinct relations.
    ///
    /// Relations are drawn uniformly with replacement until the set reaches
    /// its target size.
    pub fn random<P: Policy>(population: &Population, policy: &mut P) -> Self {
        let relations: Vec<Relation> = population.relations().iter().copied().collect();
        let target = (relations.len() as f64 * policy.initial_isolation_factor()).round() as usize;
        let target = target.min(relations.len());

        let mut isolations = Isolations::new();
        while isolations.len() < target {
            isolations.insert(*policy.random_from(&relations));
        }
        Self { isolations }
    }

    /// The severed relations.
    pub fn isolations(&self) -> &Isolations {
        &self.isolations
    }

    /// Number of severed relations.
    pub fn len(&self) -> usize {
        self.isolations.len()
    }

    /// Whether nothing is severed.
    pub fn is_empty(&self) -> bool {
        self.isolations.is_empty()
    }

    /// Recombines two parents into two children.
    ///
    /// Walks this parent's isolations, then `other`'s. An isolation already
    /// held by one child goes to the other; a fresh one goes to the child a
    /// coin flip picks. Every isolation of either parent ends up in at least
    /// one child, and isolations shared by both parents end up in both.
    pub fn cross<P: Policy>(&self, other: &Chromosome, policy: &mut P) -> (Chromosome, Chromosome) {
        let mut first = Isolations::new();
        let mut second = Isolations::new();

        for &isolation in self.isolations.iter().chain(other.isolations.iter()) {
            if first.contains(&isolation) {
                second.insert(isolation);
            } else if second.contains(&isolation) {
                first.insert(isolation);
            } else if policy.binary_random() {
                first.insert(isolation);
            } else {
                second.insert(isolation);
            }
        }

        (Chromosome::new(first), Chromosome::new(second))
    }

    /// Returns a mutated copy: `add` additions, then `remove` removals, then
    /// `update` replacements (remove followed by add).
    ///
    /// An addition picks uniformly among relations not yet isolated and does
    /// nothing when every relation is. A removal evicts a uniform member and
    /// does nothing when at most one isolation is left.
    pub fn mutate<P: Policy>(
        &self,
        add: usize,
        remove: usize,
        update: usize,
        population: &Population,
        policy: &mut P,
    ) -> Chromosome {
        let mut mutant = self.clone();
        for _ in 0..add {
            mutant.add_isolation(population, policy);
        }
        for _ in 0..remove {
            mutant.remove_isolation(policy);
        }
        for _ in 0..update {
            mutant.remove_isolation(policy);
            mutant.add_isolation(population, policy);
        }
        mutant
    }

    /// Evaluates the chromosome: its size when the simulated epidemic stays
    /// at or below [`EPIDEMIC_LIMIT_PERCENT`], `None` otherwise.
    pub fn cost(&self, population: &Population, virality: usize) -> Cost {
        let infected = population.run(virality, &self.isolations);
        if infected > EPIDEMIC_LIMIT_PERCENT {
            None
        } else {
            Some(self.isolations.len())
        }
    }

    fn add_isolation<P: Policy>(&mut self, population: &Population, policy: &mut P) {
        let available: Vec<Relation> = population
            .relations()
            .difference(&self.isolations)
            .copied()
            .collect();
        if available.is_empty() {
            return;
        }
        self.isolations.insert(*policy.random_from(&available));
    }

    fn remove_isolation<P: Policy>(&mut self, policy: &mut P) {
        if self.isolations.len() <= 1 {
            return;
        }
        let index = policy.random_to(self.isolations.len() - 1);
        if let Some(victim) = self.isolations.iter().nth(index).copied() {
            self.isolations.remove(&victim);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
