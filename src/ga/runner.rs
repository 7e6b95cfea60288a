//! Evolutionary loop execution.
//!
//! [`Evolution`] owns the live chromosome pool and runs generations until
//! stopped. One generation:
//!
//! 1. mutate random live chromosomes (regular magnitudes),
//! 2. cross random distinct pairs,
//! 3. evaluate the whole pool,
//! 4. evict the worst chromosomes down to the target size,
//! 5. repair invalid survivors with a large add-only mutation,
//! 6. re-evaluate the repaired chromosomes and report the best valid one.
//!
//! A generation whose mutants and children were all evicted or repaired
//! reports no best.
//!
//! The driver is the only place randomness is drawn; batch workers get
//! forked policies.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::epidemic::Population;

use super::chromosome::Chromosome;
use super::parallel::{cross_batch, evaluate_costs, mutate_batch, CostTable, CrossTask, MutationTask};
use super::policy::{Policy, SeededPolicy};
use super::pool::ChromosomePool;
use super::types::{ChromosomeId, Progress, Solution};

/// Lifecycle of an [`Evolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, not yet run.
    Idle,
    /// Inside [`Evolution::run`].
    Running,
    /// Run finished. Terminal.
    Stopped,
}

/// Errors surfaced by the driver.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("evolution already started")]
    AlreadyStarted,
}

/// Cooperative cancellation token.
///
/// Cloneable and `Send`; [`stop`](Self::stop) never blocks. The driver checks
/// it between generations, so a stop takes effect once the current
/// generation completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests the run to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of [`Evolution::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Best valid solution found, if any.
    pub best: Option<Solution>,
    /// Generations executed.
    pub generations: usize,
    /// Whether the run ended through its [`StopHandle`].
    pub cancelled: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// What one generation did.
#[derive(Debug, Clone)]
pub(crate) struct GenerationReport {
    /// Generation number, 1-based.
    pub(crate) generation: usize,
    /// Chromosomes created by mutation and crossover.
    pub(crate) created: usize,
    /// Chromosomes evicted by pruning.
    pub(crate) evicted: usize,
    /// Created chromosomes still live and valid after pruning.
    pub(crate) survivors: usize,
    /// Invalid chromosomes replaced by a repaired mutant.
    pub(crate) repaired: usize,
    /// The generation's best valid chromosome. `None` when there are no
    /// survivors, or nothing live is valid.
    pub(crate) best: Option<Solution>,
}

/// The isolation search driver.
///
/// # Usage
///
/// ```
/// use u_contagion::epidemic::Population;
/// use u_contagion::ga::{Evolution, IsolationConfig, SeededPolicy};
///
/// let mut population = Population::new(4);
/// population.add_infected(0);
/// for (i, j) in [(0, 1), (0, 2), (1, 2), (2, 3)] {
///     population.add_relation(i, j);
/// }
///
/// let config = IsolationConfig::default()
///     .with_virality(1)
///     .with_seed(42)
///     .with_max_generations(20);
/// let mut evolution = Evolution::new(&population, SeededPolicy::new(config)).unwrap();
/// let summary = evolution.run(|progress| println!("{}", progress.solution.cost)).unwrap();
/// assert!(summary.best.is_some());
/// ```
pub struct Evolution<'a, P: Policy = SeededPolicy> {
    population: &'a Population,
    policy: P,
    pool: ChromosomePool,
    state: RunState,
    stop: StopHandle,
    best: Option<Solution>,
    generation: usize,
}

impl<'a, P: Policy> Evolution<'a, P> {
    /// Seeds the live pool with random chromosomes.
    ///
    /// Fails when the policy's configuration is invalid. A population
    /// without relations is accepted: every chromosome is then empty.
    pub fn new(population: &'a Population, mut policy: P) -> Result<Self, EvolutionError> {
        policy
            .config()
            .validate()
            .map_err(EvolutionError::InvalidConfig)?;

        let mut pool = ChromosomePool::new();
        for _ in 0..policy.target_population() {
            pool.insert(Chromosome::random(population, &mut policy));
        }

        Ok(Self {
            population,
            policy,
            pool,
            state: RunState::Idle,
            stop: StopHandle::default(),
            best: None,
            generation: 0,
        })
    }

    /// Token that stops [`run`](Self::run) at the next generation boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests the run to stop. Same as `stop_handle().stop()`.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Best solution found so far.
    pub fn best(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    /// Generations executed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The live chromosomes.
    pub fn pool(&self) -> &ChromosomePool {
        &self.pool
    }

    /// Runs generations until stopped or a configured limit is reached.
    ///
    /// `observer` receives every strict improvement of the best solution,
    /// as soon as it is found. A stop requested before `run` is honoured:
    /// no generation executes.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            persons = self.population.size(),
            relations = self.population.relations().len()
        )
    )]
    pub fn run<F>(&mut self, mut observer: F) -> Result<RunSummary, EvolutionError>
    where
        F: FnMut(&Progress<'_>),
    {
        if self.state != RunState::Idle {
            return Err(EvolutionError::AlreadyStarted);
        }
        self.state = RunState::Running;

        let start = Instant::now();
        let max_generations = self.policy.config().max_generations;
        let time_limit = self.policy.config().time_limit_ms.map(Duration::from_millis);
        info!(target_population = self.policy.target_population(), "evolution started");

        let mut cancelled = false;
        loop {
            if self.stop.is_stopped() {
                cancelled = true;
                break;
            }
            if max_generations.is_some_and(|max| self.generation >= max) {
                break;
            }
            if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break;
            }

            let report = self.evolve();
            let Some(candidate) = report.best else {
                continue;
            };
            let improves = self
                .best
                .as_ref()
                .map_or(true, |best| candidate.cost < best.cost);
            if improves {
                info!(generation = report.generation, cost = candidate.cost, "new best");
                let solution = self.best.insert(candidate);
                observer(&Progress {
                    generation: report.generation,
                    elapsed: start.elapsed(),
                    solution,
                });
            }
        }

        self.state = RunState::Stopped;
        let elapsed = start.elapsed();
        info!(
            generations = self.generation,
            cancelled,
            best = ?self.best.as_ref().map(|b| b.cost),
            "evolution stopped"
        );

        Ok(RunSummary {
            best: self.best.clone(),
            generations: self.generation,
            cancelled,
            elapsed,
        })
    }

    /// Runs one generation.
    pub(crate) fn evolve(&mut self) -> GenerationReport {
        self.generation += 1;
        let parallel = self.policy.config().parallel;
        let virality = self.policy.virality();
        let sentinel = self.population.relations().len();

        let mut created: BTreeSet<ChromosomeId> = BTreeSet::new();
        created.extend(self.mutate_random_chromosomes(parallel));
        created.extend(self.cross_random_chromosomes(parallel));

        let mut costs = {
            let batch: Vec<(ChromosomeId, &Chromosome)> = self.pool.iter().collect();
            evaluate_costs(&batch, self.population, virality, sentinel, parallel)
        };

        let evicted = self.remove_worst_chromosomes(&mut costs, sentinel, &created);
        // Counted before repair: invalid survivors are about to be replaced,
        // and a repaired mutant may reuse an evicted child's handle.
        let survivors = created
            .iter()
            .filter(|&&id| self.pool.contains(id) && !costs.invalid().contains(&id))
            .count();
        let repaired = self.replace_invalid_chromosomes(&mut costs, sentinel, parallel);

        let repaired_batch: Vec<(ChromosomeId, &Chromosome)> = repaired
            .iter()
            .filter_map(|&id| self.pool.get(id).map(|c| (id, c)))
            .collect();
        let update = evaluate_costs(&repaired_batch, self.population, virality, sentinel, parallel);
        costs.merge(update, sentinel);

        let best = if survivors > 0 {
            costs.best_valid().and_then(|(cost, id)| {
                self.pool.get(id).map(|c| Solution {
                    cost,
                    isolations: c.isolations().clone(),
                })
            })
        } else {
            None
        };

        let report = GenerationReport {
            generation: self.generation,
            created: created.len(),
            evicted,
            survivors,
            repaired: repaired.len(),
            best,
        };
        debug!(
            generation = report.generation,
            created = report.created,
            evicted = report.evicted,
            survivors = report.survivors,
            repaired = report.repaired,
            best = ?report.best.as_ref().map(|b| b.cost),
            "generation complete"
        );
        report
    }

    /// Mutates `mutation_count` random live chromosomes and inserts the mutants.
    fn mutate_random_chromosomes(&mut self, parallel: bool) -> Vec<ChromosomeId> {
        let ids: Vec<ChromosomeId> = self.pool.ids().collect();
        let bound = self.policy.mutation_max();

        let mut plan = Vec::with_capacity(self.policy.mutation_count());
        for _ in 0..self.policy.mutation_count() {
            let id = *self.policy.random_from(&ids);
            let add = self.policy.random_to(bound);
            let remove = self.policy.random_to(bound);
            let update = self.policy.random_to(bound);
            plan.push((id, add, remove, update, self.policy.fork()));
        }

        let tasks: Vec<MutationTask<'_, P>> = plan
            .into_iter()
            .filter_map(|(id, add, remove, update, policy)| {
                self.pool.get(id).map(|parent| MutationTask {
                    parent,
                    add,
                    remove,
                    update,
                    policy,
                })
            })
            .collect();
        let mutants = mutate_batch(tasks, self.population, parallel);
        self.pool.extend(mutants)
    }

    /// Crosses `cross_count` random distinct pairs and inserts the children.
    fn cross_random_chromosomes(&mut self, parallel: bool) -> Vec<ChromosomeId> {
        let ids: Vec<ChromosomeId> = self.pool.ids().collect();

        let mut plan = Vec::with_capacity(self.policy.cross_count());
        for _ in 0..self.policy.cross_count() {
            let (i, j) = self.policy.random_pair(ids.len() - 1);
            plan.push((ids[i], ids[j], self.policy.fork()));
        }

        let tasks: Vec<CrossTask<'_, P>> = plan
            .into_iter()
            .filter_map(|(a, b, policy)| {
                let first = self.pool.get(a)?;
                let second = self.pool.get(b)?;
                Some(CrossTask {
                    first,
                    second,
                    policy,
                })
            })
            .collect();
        let children = cross_batch(tasks, parallel);
        self.pool.extend(children)
    }

    /// Evicts the highest-cost chromosomes until the pool is back to its
    /// target size, older ones before `created` ones of equal cost. Returns
    /// the number evicted.
    fn remove_worst_chromosomes(
        &mut self,
        costs: &mut CostTable,
        sentinel: usize,
        created: &BTreeSet<ChromosomeId>,
    ) -> usize {
        let excess = self.pool.len().saturating_sub(self.policy.target_population());
        let victims: Vec<ChromosomeId> = costs.worst_first(created).take(excess).collect();
        for &id in &victims {
            self.pool.remove(id);
            costs.forget(id, sentinel);
        }
        victims.len()
    }

    /// Replaces every invalid live chromosome by an add-only mutant of
    /// itself. Returns the handles of the repaired chromosomes.
    fn replace_invalid_chromosomes(
        &mut self,
        costs: &mut CostTable,
        sentinel: usize,
        parallel: bool,
    ) -> Vec<ChromosomeId> {
        let invalid: Vec<ChromosomeId> = costs
            .invalid()
            .iter()
            .copied()
            .filter(|&id| self.pool.contains(id))
            .collect();

        let mut originals = Vec::with_capacity(invalid.len());
        for id in invalid {
            costs.forget(id, sentinel);
            if let Some(chromosome) = self.pool.remove(id) {
                originals.push(chromosome);
            }
        }

        let bound = self.policy.repair_max();
        let mut plan = Vec::with_capacity(originals.len());
        for _ in 0..originals.len() {
            plan.push((self.policy.random_to(bound), self.policy.fork()));
        }

        let tasks: Vec<MutationTask<'_, P>> = originals
            .iter()
            .zip(plan)
            .map(|(parent, (add, policy))| MutationTask {
                parent,
                add,
                remove: 0,
                update: 0,
                policy,
            })
            .collect();
        let repaired = mutate_batch(tasks, self.population, parallel);
        self.pool.extend(repaired)
    }
}

// ============================================================================
// Tests
// ============================================================================
