//! Genetic search for cheap isolation sets.
//!
//! A chromosome is a set of relations to sever. Its cost is the number of
//! severed relations when the simulated epidemic stays at or below half the
//! population, and it is invalid otherwise. The [`Evolution`] driver keeps a
//! fixed-size pool of chromosomes, breeds it generation after generation and
//! reports every strict improvement of the best valid chromosome.
//!
//! # Key Types
//!
//! - [`IsolationConfig`]: Tunables (virality, pool size, operator counts, limits)
//! - [`Policy`] / [`SeededPolicy`]: Randomness and tunables behind one seam
//! - [`Chromosome`]: Isolation set with crossover, mutation and evaluation
//! - [`ChromosomePool`]: Arena owning the live chromosomes
//! - [`Evolution`]: Executes the generation loop until stopped
//!
//! # Submodules
//!
//! - [`parallel`]: Batch evaluation, crossover and mutation over rayon

mod chromosome;
mod config;
pub mod parallel;
mod policy;
mod pool;
mod runner;
mod types;

pub use chromosome::{Chromosome, EPIDEMIC_LIMIT_PERCENT};
pub use config::IsolationConfig;
pub use parallel::CostTable;
pub use policy::{Policy, SeededPolicy};
pub use pool::ChromosomePool;
pub use runner::{Evolution, EvolutionError, RunState, RunSummary, StopHandle};
pub use types::{ChromosomeId, Cost, Progress, Solution};
