//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the run parameters of a timetable
//! search: population and child pool sizes, the generation limit, elitism,
//! the staged mutation schedule, the stopping criterion and logging.
//!
//! ## Example
//!
//! ```rust
//! use timetabler::evolution::options::{EvolutionOptions, LogLevel};
//!
//! let options = EvolutionOptions::builder()
//!     .num_generations(200)
//!     .population_size(40)
//!     .num_offspring(60)
//!     .elite_fraction(0.25)
//!     .log_level(LogLevel::Minimal)
//!     .seed(7)
//!     .build();
//!
//! assert!(options.validate().is_ok());
//! assert_eq!(options.get_num_generations(), 200);
//!
//! let default_options = EvolutionOptions::default();
//! assert_eq!(default_options.get_population_size(), 100);
//! ```
//!
//! ## Mutation schedule
//!
//! The mutation probability changes as the run progresses. A
//! [`MutationSchedule`] is a list of tiers, each covering generations up to a
//! fraction of the generation limit. The default schedule mutates with
//! probability 0.4 in the first half of the run, 0.3 up to three quarters
//! and 0.2 in the final quarter.

use crate::error::{Result, TimetableError};
use crate::fitness::FitnessWeights;
use crate::schedule::BoundedPlacementSearch;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Generation summaries plus the score of every schedule.
    Verbose,
    /// One summary line per generation.
    Minimal,
    None,
}

/// One stage of a [`MutationSchedule`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationTier {
    /// Exclusive upper bound of the stage as a fraction of the generation limit.
    pub until: f64,
    pub probability: f64,
}

/// Mutation probability as a function of run progress.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MutationSchedule {
    tiers: Vec<MutationTier>,
}

impl MutationSchedule {
    /// Creates a schedule from `(until, probability)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` if there are no tiers, a
    /// probability lies outside `[0, 1]`, or the bounds are not strictly
    /// increasing within `(0, 1]`.
    pub fn new<I>(tiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let tiers: Vec<MutationTier> = tiers
            .into_iter()
            .map(|(until, probability)| MutationTier { until, probability })
            .collect();
        let schedule = Self { tiers };
        schedule.validate()?;
        Ok(schedule)
    }

    /// A schedule that uses the same probability for the whole run.
    pub fn constant(probability: f64) -> Self {
        Self {
            tiers: vec![MutationTier {
                until: 1.0,
                probability,
            }],
        }
    }

    pub fn tiers(&self) -> &[MutationTier] {
        &self.tiers
    }

    /// Mutation probability for `generation` in a run of `max_generations`.
    pub fn probability_for(&self, generation: usize, max_generations: usize) -> f64 {
        let progress = generation as f64 / max_generations.max(1) as f64;
        self.tiers
            .iter()
            .find(|tier| progress < tier.until)
            .or(self.tiers.last())
            .map(|tier| tier.probability)
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(TimetableError::Configuration(
                "Mutation schedule needs at least one tier".to_string(),
            ));
        }
        let mut previous = 0.0;
        for tier in &self.tiers {
            if !(0.0..=1.0).contains(&tier.probability) {
                return Err(TimetableError::Configuration(format!(
                    "Mutation probability must be in the range [0, 1], got {}",
                    tier.probability
                )));
            }
            if !(tier.until > previous && tier.until <= 1.0) {
                return Err(TimetableError::Configuration(format!(
                    "Mutation tier bounds must increase within (0, 1], got {} after {}",
                    tier.until, previous
                )));
            }
            previous = tier.until;
        }
        Ok(())
    }
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                MutationTier {
                    until: 0.5,
                    probability: 0.4,
                },
                MutationTier {
                    until: 0.75,
                    probability: 0.3,
                },
                MutationTier {
                    until: 1.0,
                    probability: 0.2,
                },
            ],
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct EvolutionOptions {
    num_generations: usize,
    log_level: LogLevel,
    population_size: usize,
    num_offsprings: usize,
    /// Minimum number of items to process in parallel
    parallel_threshold: usize,
    elite_fraction: f64,
    mutation_schedule: MutationSchedule,
    target_fitness: Option<f64>,
    stopping_tolerance: f64,
    placement_attempts: usize,
    fitness_weights: FitnessWeights,
    seed: Option<u64>,
}

impl EvolutionOptions {
    pub fn new(
        num_generations: usize,
        log_level: LogLevel,
        population_size: usize,
        num_offsprings: usize,
    ) -> Self {
        Self {
            num_generations,
            log_level,
            population_size,
            num_offsprings,
            ..Self::default()
        }
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }

    /// Maximum number of generations.
    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    /// Size of the child pool bred every generation.
    pub fn get_num_offspring(&self) -> usize {
        self.num_offsprings
    }

    /// Returns the minimum number of items to process in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn get_elite_fraction(&self) -> f64 {
        self.elite_fraction
    }

    pub fn get_mutation_schedule(&self) -> &MutationSchedule {
        &self.mutation_schedule
    }

    /// Fitness at which the run may stop early, if any.
    pub fn get_target_fitness(&self) -> Option<f64> {
        self.target_fitness
    }

    pub fn get_stopping_tolerance(&self) -> f64 {
        self.stopping_tolerance
    }

    pub fn get_placement_attempts(&self) -> usize {
        self.placement_attempts
    }

    pub fn get_fitness_weights(&self) -> &FitnessWeights {
        &self.fitness_weights
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Placement search configured with this run's retry bound.
    pub fn placement_search(&self) -> BoundedPlacementSearch {
        BoundedPlacementSearch::new(self.placement_attempts)
    }

    /// Mutation probability for a generation of this run.
    pub fn mutation_probability(&self, generation: usize) -> f64 {
        self.mutation_schedule
            .probability_for(generation, self.num_generations)
    }

    /// Sets the number of generations.
    pub fn set_num_generations(&mut self, num_generations: usize) {
        self.num_generations = num_generations;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Sets the population size.
    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    /// Sets the number of offspring.
    pub fn set_num_offspring(&mut self, num_offsprings: usize) {
        self.num_offsprings = num_offsprings;
    }

    /// Sets the parallel threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Checks the options for consistency.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` if the population is empty,
    /// the child pool is smaller than the population, the elite fraction or
    /// a mutation probability is outside `[0, 1]`, the target or tolerance
    /// is not a finite number, or a fitness weight is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(TimetableError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if self.num_offsprings < self.population_size {
            return Err(TimetableError::Configuration(format!(
                "Number of offspring ({}) cannot be smaller than the population size ({})",
                self.num_offsprings, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(TimetableError::Configuration(format!(
                "Elite fraction must be in the range [0, 1], got {}",
                self.elite_fraction
            )));
        }
        if let Some(target) = self.target_fitness {
            if !target.is_finite() {
                return Err(TimetableError::Configuration(format!(
                    "Target fitness must be finite, got {}",
                    target
                )));
            }
        }
        if !self.stopping_tolerance.is_finite() || self.stopping_tolerance < 0.0 {
            return Err(TimetableError::Configuration(format!(
                "Stopping tolerance must be finite and non-negative, got {}",
                self.stopping_tolerance
            )));
        }
        self.mutation_schedule.validate()?;
        self.fitness_weights.validate()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            num_generations: 3000,
            log_level: LogLevel::None,
            population_size: 100,
            num_offsprings: 100,
            parallel_threshold: 64,
            elite_fraction: 0.2,
            mutation_schedule: MutationSchedule::default(),
            target_fitness: None,
            stopping_tolerance: 0.0,
            placement_attempts: BoundedPlacementSearch::DEFAULT_MAX_ATTEMPTS,
            fitness_weights: FitnessWeights::default(),
            seed: None,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions` instances.
/// Unset fields take their default values; call
/// [`EvolutionOptions::validate`] (or let the launcher do it) to check the
/// result.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    num_generations: Option<usize>,
    log_level: Option<LogLevel>,
    population_size: Option<usize>,
    num_offsprings: Option<usize>,
    parallel_threshold: Option<usize>,
    elite_fraction: Option<f64>,
    mutation_schedule: Option<MutationSchedule>,
    target_fitness: Option<f64>,
    stopping_tolerance: Option<f64>,
    placement_attempts: Option<usize>,
    fitness_weights: Option<FitnessWeights>,
    seed: Option<u64>,
}

impl EvolutionOptionsBuilder {
    /// Sets the number of generations.
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Sets the population size.
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    /// Sets the number of offspring.
    pub fn num_offspring(mut self, value: usize) -> Self {
        self.num_offsprings = Some(value);
        self
    }

    /// Sets the parallel threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    pub fn elite_fraction(mut self, value: f64) -> Self {
        self.elite_fraction = Some(value);
        self
    }

    pub fn mutation_schedule(mut self, value: MutationSchedule) -> Self {
        self.mutation_schedule = Some(value);
        self
    }

    pub fn target_fitness(mut self, value: f64) -> Self {
        self.target_fitness = Some(value);
        self
    }

    pub fn stopping_tolerance(mut self, value: f64) -> Self {
        self.stopping_tolerance = Some(value);
        self
    }

    pub fn placement_attempts(mut self, value: usize) -> Self {
        self.placement_attempts = Some(value);
        self
    }

    pub fn fitness_weights(mut self, value: FitnessWeights) -> Self {
        self.fitness_weights = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let default = EvolutionOptions::default();
        EvolutionOptions {
            num_generations: self.num_generations.unwrap_or(default.num_generations),
            log_level: self.log_level.unwrap_or(default.log_level),
            population_size: self.population_size.unwrap_or(default.population_size),
            num_offsprings: self.num_offsprings.unwrap_or(default.num_offsprings),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(default.parallel_threshold),
            elite_fraction: self.elite_fraction.unwrap_or(default.elite_fraction),
            mutation_schedule: self
                .mutation_schedule
                .unwrap_or(default.mutation_schedule),
            target_fitness: self.target_fitness.or(default.target_fitness),
            stopping_tolerance: self
                .stopping_tolerance
                .unwrap_or(default.stopping_tolerance),
            placement_attempts: self
                .placement_attempts
                .unwrap_or(default.placement_attempts),
            fitness_weights: self.fitness_weights.unwrap_or(default.fitness_weights),
            seed: self.seed.or(default.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_tiers() {
        let schedule = MutationSchedule::default();

        assert_eq!(schedule.probability_for(0, 100), 0.4);
        assert_eq!(schedule.probability_for(49, 100), 0.4);
        assert_eq!(schedule.probability_for(50, 100), 0.3);
        assert_eq!(schedule.probability_for(74, 100), 0.3);
        assert_eq!(schedule.probability_for(75, 100), 0.2);
        assert_eq!(schedule.probability_for(100, 100), 0.2);
        assert_eq!(schedule.probability_for(5, 0), 0.2);
    }

    #[test]
    fn test_schedule_validation() {
        assert!(MutationSchedule::new([(0.5, 0.4), (1.0, 0.1)]).is_ok());
        assert!(MutationSchedule::new(Vec::<(f64, f64)>::new()).is_err());
        assert!(MutationSchedule::new([(0.5, 1.4)]).is_err());
        assert!(MutationSchedule::new([(0.5, 0.4), (0.5, 0.1)]).is_err());
        assert!(MutationSchedule::new([(1.5, 0.4)]).is_err());
        assert!(MutationSchedule::constant(0.3).validate().is_ok());
    }

    #[test]
    fn test_builder_defaults() {
        let options = EvolutionOptions::builder().population_size(10).build();

        assert_eq!(options.get_population_size(), 10);
        assert_eq!(options.get_num_offspring(), 100);
        assert_eq!(options.get_num_generations(), 3000);
        assert_eq!(options.get_elite_fraction(), 0.2);
        assert_eq!(options.get_target_fitness(), None);
        assert_eq!(options.get_placement_attempts(), 100);
        assert_eq!(*options.get_log_level(), LogLevel::None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let zero_population = EvolutionOptions::new(10, LogLevel::None, 0, 10);
        match zero_population.validate() {
            Err(TimetableError::Configuration(msg)) => {
                assert!(msg.contains("Population size cannot be zero"))
            }
            _ => panic!("Expected Configuration error"),
        }

        let small_pool = EvolutionOptions::new(10, LogLevel::None, 20, 10);
        assert!(small_pool.validate().is_err());

        let bad_elite = EvolutionOptions::builder().elite_fraction(1.2).build();
        assert!(bad_elite.validate().is_err());

        let bad_tolerance = EvolutionOptions::builder().stopping_tolerance(-1.0).build();
        assert!(bad_tolerance.validate().is_err());

        let bad_target = EvolutionOptions::builder()
            .target_fitness(f64::INFINITY)
            .build();
        assert!(bad_target.validate().is_err());
    }

    #[test]
    fn test_setters() {
        let mut options = EvolutionOptions::default();
        options.set_num_generations(5);
        options.set_population_size(4);
        options.set_num_offspring(8);
        options.set_parallel_threshold(2);
        options.set_log_level(LogLevel::Verbose);
        options.set_seed(Some(9));

        assert_eq!(options.get_num_generations(), 5);
        assert_eq!(options.get_population_size(), 4);
        assert_eq!(options.get_num_offspring(), 8);
        assert_eq!(options.get_parallel_threshold(), 2);
        assert_eq!(options.get_seed(), Some(9));
        assert_eq!(options.mutation_probability(4), 0.2);
    }
}
