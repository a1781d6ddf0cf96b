//! # EvolutionLauncher
//!
//! Drives a timetable search through its life cycle:
//! `Initializing -> Evolving -> Terminated`.
//!
//! Initialization builds a random population and scores it. Every
//! generation then breeds a child pool, merges it with the parents under
//! elitism and records a [`GenerationStats`] entry. The run stops when the
//! generation limit is reached or the best score comes within the stopping
//! tolerance of the target fitness.
//!
//! ## Example
//!
//! ```rust
//! use timetabler::catalog::EventCatalog;
//! use timetabler::evolution::{EvolutionLauncher, EvolutionOptions};
//! use timetabler::rng::RandomNumberGenerator;
//!
//! let catalog = EventCatalog::from_durations(2, 5, 48, &[4, 6, 8, 4]).unwrap();
//! let options = EvolutionOptions::builder()
//!     .num_generations(10)
//!     .population_size(10)
//!     .num_offspring(10)
//!     .build();
//!
//! let launcher = EvolutionLauncher::new(catalog, options).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let result = launcher.evolve(&mut rng).unwrap();
//!
//! assert!(result.best.is_complete());
//! assert!(result.history.len() <= 11);
//! ```
use rayon::prelude::*;
use tracing::{debug, info};

use super::{
    options::{EvolutionOptions, LogLevel},
    stats::GenerationStats,
};
use crate::{
    catalog::EventCatalog,
    error::{OptionExt, Result, TimetableError},
    fitness::{Challenge, FitnessEvaluator},
    report::TimetableReport,
    rng::RandomNumberGenerator,
    schedule::Schedule,
    selection::{sort_descending, ElitistSelection},
    strategy::{BreedStrategy, TimetableBreedStrategy},
};

/// Why a run stopped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    MaxGenerations,
    TargetReached,
}

/// State of the life-cycle driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeCycleState {
    Initializing,
    /// Breeding `generation`, counted from 1.
    Evolving { generation: usize },
    Terminated(TerminationReason),
}

/// Outcome of a run.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Best schedule of the final population.
    pub best: Schedule,
    pub score: f64,
    /// Whether the best schedule is complete, consistent and overlap-free.
    pub valid: bool,
    /// Number of generations bred after initialization.
    pub generations: usize,
    pub termination: TerminationReason,
    /// One entry per generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
}

impl EvolutionResult {
    /// Builds the report handed to whoever renders the timetable.
    pub fn report(&self, catalog: &EventCatalog, options: &EvolutionOptions) -> TimetableReport {
        TimetableReport::new(catalog, &self.best, options)
    }
}

/// Runs the evolutionary search for one event catalog.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher<B = TimetableBreedStrategy, C = FitnessEvaluator>
where
    B: BreedStrategy,
    C: Challenge,
{
    catalog: EventCatalog,
    options: EvolutionOptions,
    strategy: B,
    challenge: C,
    elitism: ElitistSelection,
}

impl EvolutionLauncher<TimetableBreedStrategy, FitnessEvaluator> {
    /// Creates a launcher with the default breeding strategy and a fitness
    /// evaluator built from the options' weights.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` if the options are invalid.
    pub fn new(catalog: EventCatalog, options: EvolutionOptions) -> Result<Self> {
        options.validate()?;
        let challenge = FitnessEvaluator::with_weights(&catalog, *options.get_fitness_weights())?;
        let strategy = TimetableBreedStrategy::new(options.placement_search());
        Self::with_strategy(catalog, options, strategy, challenge)
    }
}

impl<B, C> EvolutionLauncher<B, C>
where
    B: BreedStrategy,
    C: Challenge,
{
    /// Creates a launcher with a custom breeding strategy and challenge.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::MalformedInput` if the catalog is invalid
    /// and `TimetableError::Configuration` if the options are.
    pub fn with_strategy(
        catalog: EventCatalog,
        options: EvolutionOptions,
        strategy: B,
        challenge: C,
    ) -> Result<Self> {
        catalog.validate()?;
        options.validate()?;
        let elitism = ElitistSelection::new(options.get_elite_fraction())?;
        Ok(Self {
            catalog,
            options,
            strategy,
            challenge,
            elitism,
        })
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn challenge(&self) -> &C {
        &self.challenge
    }

    /// Runs the search with a generator seeded from the options, or from
    /// entropy when no seed is configured.
    pub fn run(&self) -> Result<EvolutionResult> {
        let mut rng = match self.options.get_seed() {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };
        self.evolve(&mut rng)
    }

    /// Evolves a population until a termination condition holds.
    ///
    /// # Errors
    ///
    /// Returns an error if breeding fails or a schedule receives a
    /// non-finite score.
    pub fn evolve(&self, rng: &mut RandomNumberGenerator) -> Result<EvolutionResult> {
        let options = &self.options;
        let mut population: Vec<Schedule> = Vec::new();
        let mut history: Vec<GenerationStats> = Vec::new();
        let mut generations = 0;
        let mut state = LifeCycleState::Initializing;

        let termination = loop {
            state = match state {
                LifeCycleState::Initializing => {
                    population = self.initialize(rng)?;
                    self.record(&mut history, 0, 0.0, &population)?;
                    self.next_state(0, &population)
                }
                LifeCycleState::Evolving { generation } => {
                    let mutation_probability = options.mutation_probability(generation - 1);
                    let children = self.strategy.breed(
                        &population,
                        options,
                        mutation_probability,
                        &self.challenge,
                        rng,
                    )?;
                    check_scores(&children, generation)?;

                    population = self.elitism.merge(
                        std::mem::take(&mut population),
                        children,
                        options.get_population_size(),
                    )?;
                    generations = generation;
                    self.record(&mut history, generation, mutation_probability, &population)?;
                    self.next_state(generation, &population)
                }
                LifeCycleState::Terminated(reason) => break reason,
            };
        };

        sort_descending(&mut population);
        let best = population.into_iter().next().ok_or_else_timetable(|| {
            TimetableError::Other("Evolution finished with an empty population".to_string())
        })?;
        let valid = best.is_complete() && best.is_consistent() && !best.has_overlap();

        info!(
            generations,
            score = best.fitness(),
            valid,
            ?termination,
            "evolution finished"
        );

        Ok(EvolutionResult {
            score: best.fitness(),
            best,
            valid,
            generations,
            termination,
            history,
        })
    }

    /// Builds and scores the initial population, best first.
    fn initialize(&self, rng: &mut RandomNumberGenerator) -> Result<Vec<Schedule>> {
        let search = self.options.placement_search();
        let seeds: Vec<u64> = (0..self.options.get_population_size())
            .map(|_| rng.next_seed())
            .collect();

        let build = |&seed: &u64| {
            let mut rng = RandomNumberGenerator::from_seed(seed);
            let mut schedule = Schedule::random(&self.catalog, &search, &mut rng);
            self.challenge.evaluate(&mut schedule);
            schedule
        };

        let mut population: Vec<Schedule> =
            if seeds.len() >= self.options.get_parallel_threshold() {
                seeds.par_iter().map(build).collect()
            } else {
                seeds.iter().map(build).collect()
            };

        check_scores(&population, 0)?;
        sort_descending(&mut population);
        Ok(population)
    }

    fn next_state(&self, generation: usize, population: &[Schedule]) -> LifeCycleState {
        let best = population.first().map_or(f64::NEG_INFINITY, Schedule::fitness);
        if let Some(target) = self.options.get_target_fitness() {
            if best >= target - self.options.get_stopping_tolerance() {
                return LifeCycleState::Terminated(TerminationReason::TargetReached);
            }
        }
        if generation >= self.options.get_num_generations() {
            return LifeCycleState::Terminated(TerminationReason::MaxGenerations);
        }
        LifeCycleState::Evolving {
            generation: generation + 1,
        }
    }

    fn record(
        &self,
        history: &mut Vec<GenerationStats>,
        generation: usize,
        mutation_probability: f64,
        population: &[Schedule],
    ) -> Result<()> {
        let stats = GenerationStats::from_sorted(generation, mutation_probability, population)?;

        match self.options.get_log_level() {
            LogLevel::Minimal => log_stats(&stats),
            LogLevel::Verbose => {
                log_stats(&stats);
                for (rank, schedule) in population.iter().enumerate() {
                    debug!(
                        generation,
                        rank,
                        score = schedule.fitness(),
                        overlaps = schedule.overlap_count(),
                        "schedule"
                    );
                }
            }
            LogLevel::None => {}
        }

        history.push(stats);
        Ok(())
    }
}

fn log_stats(stats: &GenerationStats) {
    info!(
        generation = stats.generation,
        best = stats.best,
        mean = stats.mean,
        median = stats.median,
        worst = stats.worst,
        mutation_probability = stats.mutation_probability,
        "generation complete"
    );
}

fn check_scores(population: &[Schedule], generation: usize) -> Result<()> {
    match population.iter().find(|s| !s.fitness().is_finite()) {
        Some(schedule) => Err(TimetableError::FitnessCalculation(format!(
            "Non-finite fitness score {} in generation {}",
            schedule.fitness(),
            generation
        ))),
        None => Ok(()),
    }
}
