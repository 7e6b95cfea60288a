//! Isolation search configuration.
//!
//! [`IsolationConfig`] holds every tunable of the evolutionary loop.

/// Configuration for the isolation search.
///
/// Controls the epidemic threshold, the live population size, how many
/// children each generation produces, the mutation magnitudes, termination,
/// and parallelism.
///
/// # Defaults
///
/// ```
/// use u_contagion::ga::IsolationConfig;
///
/// let config = IsolationConfig::default();
/// assert_eq!(config.target_population, 10);
/// assert_eq!(config.mutation_count, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_contagion::ga::IsolationConfig;
///
/// let config = IsolationConfig::default()
///     .with_virality(3)
///     .with_target_population(20)
///     .with_cross_count(15)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsolationConfig {
    /// Minimum number of infected neighbors that infects a healthy person
    /// in one propagation step.
    pub virality: usize,

    /// Fraction of all relations isolated by a freshly sampled chromosome
    /// (0.0–1.0).
    pub initial_isolation_factor: f64,

    /// Number of chromosomes kept alive after each generation's pruning.
    pub target_population: usize,

    /// Crossovers per generation. Each produces two children.
    pub cross_count: usize,

    /// Mutations per generation. Each produces one child.
    pub mutation_count: usize,

    /// Upper bound (inclusive) of the add, remove and update counts drawn for
    /// a regular mutation.
    pub mutation_max: usize,

    /// Upper bound (inclusive) of the isolations added when repairing an
    /// invalid chromosome. Should exceed `mutation_max`.
    pub repair_max: usize,

    /// Whether to run the batch operations in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional generation limit.
    ///
    /// `None` runs until stopped (the default).
    pub max_generations: Option<usize>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked between generations, so the run may exceed it by up to one
    /// generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            virality: 5,
            initial_isolation_factor: 0.5,
            target_population: 10,
            cross_count: 10,
            mutation_count: 100,
            mutation_max: 10,
            repair_max: 200,
            parallel: true,
            seed: None,
            max_generations: None,
            time_limit_ms: None,
        }
    }
}

impl IsolationConfig {
    /// Sets the virality threshold.
    pub fn with_virality(mut self, virality: usize) -> Self {
        self.virality = virality;
        self
    }

    /// Sets the initial isolation factor.
    pub fn with_initial_isolation_factor(mut self, factor: f64) -> Self {
        self.initial_isolation_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Sets the live population size.
    pub fn with_target_population(mut self, n: usize) -> Self {
        self.target_population = n;
        self
    }

    /// Sets the number of crossovers per generation.
    pub fn with_cross_count(mut self, n: usize) -> Self {
        self.cross_count = n;
        self
    }

    /// Sets the number of mutations per generation.
    pub fn with_mutation_count(mut self, n: usize) -> Self {
        self.mutation_count = n;
        self
    }

    /// Sets the regular mutation bound.
    pub fn with_mutation_max(mut self, n: usize) -> Self {
        self.mutation_max = n;
        self
    }

    /// Sets the repair mutation bound.
    pub fn with_repair_max(mut self, n: usize) -> Self {
        self.repair_max = n;
        self
    }

    /// Enables or disables parallel batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_population < 2 {
            return Err("target_population must be at least 2".into());
        }
        if !(0.0..=1.0).contains(&self.initial_isolation_factor) {
            return Err("initial_isolation_factor must be within 0.0..=1.0".into());
        }
        if self.repair_max <= self.mutation_max {
            return Err("repair_max must exceed mutation_max".into());
        }
        if self.max_generations == Some(0) {
            return Err("max_generations must be positive or None".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}
