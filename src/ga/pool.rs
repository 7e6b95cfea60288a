//! Arena of live chromosomes addressed by stable handles.
//!
//! The pool is the single owner of every live chromosome. Removing a handle
//! hands ownership back to the caller, who either reinserts a replacement or
//! lets the chromosome drop. Freed slots are reused by later insertions.

use std::collections::BTreeSet;

use super::chromosome::Chromosome;
use super::types::ChromosomeId;

/// Slot arena holding the live population.
#[derive(Debug, Clone, Default)]
pub struct ChromosomePool {
    slots: Vec<Option<Chromosome>>,
    free: Vec<usize>,
    live: BTreeSet<ChromosomeId>,
}

impl ChromosomePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live chromosomes.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the pool holds no chromosome.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Takes ownership of `chromosome` and returns its handle.
    pub fn insert(&mut self, chromosome: Chromosome) -> ChromosomeId {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(chromosome);
                index
            }
            None => {
                self.slots.push(Some(chromosome));
                self.slots.len() - 1
            }
        };
        let id = ChromosomeId(index);
        self.live.insert(id);
        id
    }

    /// Inserts every chromosome of `batch`, returning their handles in order.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Chromosome>) -> Vec<ChromosomeId> {
        batch.into_iter().map(|c| self.insert(c)).collect()
    }

    /// Removes `id` from the pool and returns the chromosome it held.
    pub fn remove(&mut self, id: ChromosomeId) -> Option<Chromosome> {
        if !self.live.remove(&id) {
            return None;
        }
        self.free.push(id.0);
        self.slots[id.0].take()
    }

    /// Whether `id` refers to a live chromosome.
    pub fn contains(&self, id: ChromosomeId) -> bool {
        self.live.contains(&id)
    }

    /// The chromosome behind `id`, if live.
    pub fn get(&self, id: ChromosomeId) -> Option<&Chromosome> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Live handles in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ChromosomeId> + '_ {
        self.live.iter().copied()
    }

    /// Live chromosomes with their handles, in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ChromosomeId, &Chromosome)> + '_ {
        self.live
            .iter()
            .filter_map(|&id| self.get(id).map(|c| (id, c)))
    }
}
