//! Single-pass greedy isolation baseline.
//!
//! Every person exposed to at least `virality` infected neighbors gets
//! relations to those neighbors severed, in ascending neighbor order, until
//! fewer than `virality` infected contacts remain. The result is a quick
//! upper bound to compare the genetic search against; it only looks at the
//! initial infection front and does not simulate propagation.

use super::population::Population;
use super::types::{Isolations, Relation};

/// Computes the greedy isolation set for `population` at `virality`.
pub fn isolate_infected(population: &Population, virality: usize) -> Isolations {
    let mut isolations = Isolations::new();

    for person in 0..population.size() {
        let exposed = population.infected_neighbors(person);
        if exposed.len() < virality {
            continue;
        }

        let mut remaining = exposed.len();
        for &neighbor in exposed {
            if remaining < virality {
                break;
            }
            if let Some(relation) = Relation::new(person, neighbor) {
                isolations.insert(relation);
            }
            remaining -= 1;
        }
    }

    isolations
}
