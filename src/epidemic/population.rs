//! Contact graph with incrementally maintained infection state.
//!
//! [`Population`] keeps four views in sync as relations and infections are
//! added or removed:
//!
//! - the set of all relations,
//! - per-person adjacency (symmetric),
//! - the infected set,
//! - per-person infected neighbors (always a subset of adjacency).
//!
//! Propagation follows a threshold rule: a healthy person becomes infected in
//! a step when at least `virality` of their neighbors are already infected.
//! All infections of a step are applied together once the scan is complete.

use std::collections::BTreeSet;

use super::types::{Isolations, Person, Relation};

/// The population's contact graph and infection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    size: usize,
    relations: BTreeSet<Relation>,
    adjacency: Vec<BTreeSet<Person>>,
    infected: BTreeSet<Person>,
    infected_neighbors: Vec<BTreeSet<Person>>,
}

impl Population {
    /// Creates a population of `size` persons with no relation and no infection.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            relations: BTreeSet::new(),
            adjacency: vec![BTreeSet::new(); size],
            infected: BTreeSet::new(),
            infected_neighbors: vec![BTreeSet::new(); size],
        }
    }

    /// Number of persons.
    pub fn size(&self) -> usize {
        self.size
    }

    /// All relations, normalized and ordered.
    pub fn relations(&self) -> &BTreeSet<Relation> {
        &self.relations
    }

    /// Persons related to `person`.
    pub fn neighbors(&self, person: Person) -> &BTreeSet<Person> {
        &self.adjacency[person]
    }

    /// Currently infected persons.
    pub fn infected(&self) -> &BTreeSet<Person> {
        &self.infected
    }

    /// Infected persons related to `person`.
    pub fn infected_neighbors(&self, person: Person) -> &BTreeSet<Person> {
        &self.infected_neighbors[person]
    }

    /// Whether `person` is infected.
    pub fn is_infected(&self, person: Person) -> bool {
        self.infected.contains(&person)
    }

    /// Share of the population currently infected, in percent.
    pub fn infected_percent(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.infected.len() as f64 * 100.0 / self.size as f64
    }

    /// Adds the relation `i–j`.
    ///
    /// Self-relations and already present relations are ignored. If either
    /// endpoint is infected, the other endpoint's infected-neighbor view is
    /// updated.
    ///
    /// # Panics
    /// Panics if `i` or `j` is outside the population.
    pub fn add_relation(&mut self, i: Person, j: Person) {
        self.check_person(i);
        self.check_person(j);

        let Some(relation) = Relation::new(i, j) else {
            return;
        };
        if !self.relations.insert(relation) {
            return;
        }

        self.adjacency[i].insert(j);
        self.adjacency[j].insert(i);

        if self.infected.contains(&i) {
            self.infected_neighbors[j].insert(i);
        }
        if self.infected.contains(&j) {
            self.infected_neighbors[i].insert(j);
        }
    }

    /// Removes the relation `i–j` from every view, whatever the infection
    /// status of its endpoints. Absent relations are ignored.
    ///
    /// # Panics
    /// Panics if `i` or `j` is outside the population.
    pub fn remove_relation(&mut self, i: Person, j: Person) {
        self.check_person(i);
        self.check_person(j);

        let Some(relation) = Relation::new(i, j) else {
            return;
        };
        if !self.relations.remove(&relation) {
            return;
        }

        self.adjacency[i].remove(&j);
        self.adjacency[j].remove(&i);
        self.infected_neighbors[i].remove(&j);
        self.infected_neighbors[j].remove(&i);
    }

    /// Marks `person` infected and propagates the fact to their neighbors'
    /// infected-neighbor views. Already infected persons are ignored.
    ///
    /// # Panics
    /// Panics if `person` is outside the population.
    pub fn add_infected(&mut self, person: Person) {
        self.check_person(person);

        if !self.infected.insert(person) {
            return;
        }
        for &neighbor in &self.adjacency[person] {
            self.infected_neighbors[neighbor].insert(person);
        }
    }

    /// Runs one propagation step and returns the number of new infections.
    ///
    /// Persons infected during this step do not count toward other persons'
    /// thresholds until the next step. Returns 0 at the fixed point.
    pub fn run_iteration(&mut self, virality: usize) -> usize {
        let new_cases: Vec<Person> = (0..self.size)
            .filter(|person| !self.infected.contains(person))
            .filter(|&person| self.infected_neighbors[person].len() >= virality)
            .collect();

        for &person in &new_cases {
            self.add_infected(person);
        }
        new_cases.len()
    }

    /// Simulates the epidemic with `isolations` severed and returns the final
    /// infected percentage.
    ///
    /// Works on a private copy: `self` is left untouched.
    pub fn run(&self, virality: usize, isolations: &Isolations) -> f64 {
        let mut simulation = self.clone();
        for relation in isolations {
            simulation.remove_relation(relation.low(), relation.high());
        }
        while simulation.run_iteration(virality) > 0 {}
        simulation.infected_percent()
    }

    fn check_person(&self, person: Person) {
        assert!(
            person < self.size,
            "person {person} outside population of size {}",
            self.size
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(i: Person, j: Person) -> Relation {
        Relation::new(i, j).unwrap()
    }

    /// Six persons, {0, 1} infected, eight relations.
    fn outbreak() -> Population {
        let mut pop = Population::new(6);
        pop.add_infected(0);
        pop.add_infected(1);
        for (i, j) in [
            (0, 2),
            (0, 3),
            (1, 2),
            (1, 5),
            (2, 3),
            (2, 4),
            (3, 4),
            (3, 5),
        ] {
            pop.add_relation(i, j);
        }
        pop
    }

    /// Relations added and removed around a mixed infected set.
    fn edited() -> Population {
        let mut pop = Population::new(7);
        pop.add_infected(0);
        pop.add_infected(2);
        pop.add_infected(3);
        pop.add_infected(6);
        for (i, j) in [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (1, 2), (1, 3), (3, 4)] {
            pop.add_relation(i, j);
        }
        pop.remove_relation(1, 3);
        pop.remove_relation(4, 3);
        pop
    }

    fn set(items: &[Person]) -> BTreeSet<Person> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_relations_inserted() {
        let pop = edited();
        assert_eq!(pop.relations().len(), 6);
        assert_eq!(pop.neighbors(0), &set(&[1, 2, 3, 4, 5]));
        assert_eq!(pop.neighbors(1), &set(&[0, 2]));
        assert_eq!(pop.neighbors(2), &set(&[0, 1]));
        assert_eq!(pop.neighbors(3), &set(&[0]));
        assert_eq!(pop.neighbors(4), &set(&[0]));
        assert_eq!(pop.neighbors(5), &set(&[0]));
        assert!(pop.neighbors(6).is_empty());
    }

    #[test]
    fn test_infected_neighbors_tracked() {
        let pop = edited();
        assert_eq!(pop.infected().len(), 4);
        assert_eq!(pop.infected_neighbors(0), &set(&[2, 3]));
        assert_eq!(pop.infected_neighbors(1), &set(&[0, 2]));
        assert_eq!(pop.infected_neighbors(2), &set(&[0]));
        assert_eq!(pop.infected_neighbors(3), &set(&[0]));
        assert_eq!(pop.infected_neighbors(4), &set(&[0]));
        assert_eq!(pop.infected_neighbors(5), &set(&[0]));
        assert!(pop.infected_neighbors(6).is_empty());
    }

    #[test]
    fn test_add_relation_ignores_duplicates_and_self() {
        let mut pop = Population::new(3);
        pop.add_relation(0, 1);
        pop.add_relation(1, 0);
        pop.add_relation(2, 2);
        assert_eq!(pop.relations().len(), 1);
        assert_eq!(pop.neighbors(1), &set(&[0]));
        assert!(pop.neighbors(2).is_empty());
    }

    #[test]
    fn test_add_infected_is_idempotent() {
        let mut pop = outbreak();
        let before = pop.clone();
        pop.add_infected(0);
        assert_eq!(pop, before);
    }

    #[test]
    fn test_symmetry_invariant() {
        let pop = outbreak();
        for r in pop.relations() {
            assert!(pop.neighbors(r.low()).contains(&r.high()));
            assert!(pop.neighbors(r.high()).contains(&r.low()));
        }
        for person in 0..pop.size() {
            for &n in pop.infected_neighbors(person) {
                assert!(pop.neighbors(person).contains(&n));
                assert!(pop.is_infected(n));
            }
        }
    }

    #[test]
    fn test_remove_relation_clears_both_directions() {
        let mut pop = outbreak();
        pop.remove_relation(2, 0);
        assert!(!pop.relations().contains(&relation(0, 2)));
        assert!(!pop.neighbors(0).contains(&2));
        assert!(!pop.neighbors(2).contains(&0));
        assert!(!pop.infected_neighbors(2).contains(&0));

        // Absent relation is a no-op.
        let before = pop.clone();
        pop.remove_relation(4, 5);
        assert_eq!(pop, before);
    }

    #[test]
    fn test_propagation_steps() {
        let mut pop = outbreak();
        assert_eq!(pop.infected(), &set(&[0, 1]));

        assert_eq!(pop.run_iteration(2), 1);
        assert_eq!(pop.infected(), &set(&[0, 1, 2]));

        assert_eq!(pop.run_iteration(2), 1);
        assert_eq!(pop.infected(), &set(&[0, 1, 2, 3]));

        assert_eq!(pop.run_iteration(2), 2);
        assert_eq!(pop.infected(), &set(&[0, 1, 2, 3, 4, 5]));

        assert_eq!(pop.run_iteration(2), 0);
        assert_eq!(pop.infected().len(), 6);
    }

    #[test]
    fn test_step_is_simultaneous() {
        // 0 infected, chain 0-1-2: with virality 1 only 1 falls in the first step.
        let mut pop = Population::new(3);
        pop.add_infected(0);
        pop.add_relation(0, 1);
        pop.add_relation(1, 2);
        assert_eq!(pop.run_iteration(1), 1);
        assert!(!pop.is_infected(2));
        assert_eq!(pop.run_iteration(1), 1);
        assert!(pop.is_infected(2));
    }

    #[test]
    fn test_fixed_point_is_idempotent() {
        let mut pop = outbreak();
        while pop.run_iteration(3) > 0 {}
        let settled = pop.infected().clone();
        for _ in 0..5 {
            assert_eq!(pop.run_iteration(3), 0);
            assert_eq!(pop.infected(), &settled);
        }
    }

    #[test]
    fn test_infection_is_monotonic() {
        let mut pop = outbreak();
        let mut previous = pop.infected().clone();
        while pop.run_iteration(2) > 0 {
            assert!(previous.is_subset(pop.infected()));
            previous = pop.infected().clone();
        }
    }

    #[test]
    fn test_run_leaves_canonical_untouched() {
        let pop = outbreak();
        let before = pop.clone();
        let percent = pop.run(2, &Isolations::new());
        assert!((percent - 100.0).abs() < 1e-9);
        assert_eq!(pop, before);
    }

    #[test]
    fn test_run_with_isolations() {
        let pop = outbreak();
        let cut: Isolations = [(2, 3), (3, 4), (3, 5)]
            .into_iter()
            .map(|(i, j)| relation(i, j))
            .collect();
        assert!((pop.run(2, &cut) - 50.0).abs() < 1e-9);

        let cut: Isolations = [(3, 4), (3, 5)]
            .into_iter()
            .map(|(i, j)| relation(i, j))
            .collect();
        assert!(pop.run(2, &cut) > 50.0);
    }

    #[test]
    fn test_run_virality_one_full_cut() {
        let pop = outbreak();
        let cut: Isolations = [(0, 2), (0, 3), (1, 2), (1, 5)]
            .into_iter()
            .map(|(i, j)| relation(i, j))
            .collect();
        let percent = pop.run(1, &cut);
        assert!((percent - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_isolations_never_spread_less() {
        let pop = outbreak();
        let full: Isolations = [(0, 2), (2, 3), (3, 4), (3, 5)]
            .into_iter()
            .map(|(i, j)| relation(i, j))
            .collect();
        let full_spread = pop.run(2, &full);
        for dropped in &full {
            let mut partial = full.clone();
            partial.remove(dropped);
            assert!(pop.run(2, &partial) >= full_spread);
        }
    }

    #[test]
    fn test_empty_population() {
        let pop = Population::new(0);
        assert_eq!(pop.run(1, &Isolations::new()), 0.0);
    }

    #[test]
    #[should_panic(expected = "outside population")]
    fn test_out_of_range_person_panics() {
        let mut pop = Population::new(2);
        pop.add_relation(0, 2);
    }
}
