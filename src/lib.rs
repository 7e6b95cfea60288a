//! Contact isolation search for threshold epidemics.
//!
//! Given a contact graph and an initial set of infected persons, find a small
//! set of relations to sever so that the epidemic, once it reaches its fixed
//! point, infects at most half of the population.
//!
//! - **Epidemic model**: Undirected contact graph with a threshold spreading
//!   rule, a dataset loader, and a greedy baseline.
//! - **Genetic Algorithm (GA)**: Pool-based evolutionary search over
//!   isolation sets, with rayon-parallel batches and cooperative stopping.
//!
//! # Quick start
//!
//! ```
//! use u_contagion::epidemic::{greedy, Population};
//!
//! let mut population = Population::new(3);
//! population.add_infected(0);
//! population.add_relation(0, 1);
//! population.add_relation(1, 2);
//!
//! let cuts = greedy::isolate_infected(&population, 1);
//! assert!(population.run(1, &cuts) <= 50.0);
//! ```

pub mod epidemic;
pub mod ga;
