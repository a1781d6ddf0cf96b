//! # BreedStrategy
//!
//! The `BreedStrategy` trait defines the interface for strategies responsible for breeding
//! the child pool of a generation from the current population.
pub mod timetable;

use std::fmt::Debug;

use crate::{
    error::Result, evolution::options::EvolutionOptions, fitness::Challenge,
    rng::RandomNumberGenerator, schedule::Schedule,
};

/// # BreedStrategy
///
/// The `BreedStrategy` trait defines the interface for strategies responsible for breeding
/// new schedules from a population sorted best first.
pub trait BreedStrategy
where
    Self: Debug + Clone + Send + Sync,
{
    /// Breeds `evol_options.get_num_offspring()` scored children.
    ///
    /// ## Parameters
    ///
    /// - `population`: The current population, sorted best first.
    /// - `evol_options`: The evolution options specifying algorithm parameters.
    /// - `mutation_probability`: The mutation probability of this generation.
    /// - `challenge`: The fitness function children are scored with.
    /// - `rng`: The random number generator of the run.
    ///
    /// ## Errors
    ///
    /// This method fails if the population is empty.
    fn breed<C>(
        &self,
        population: &[Schedule],
        evol_options: &EvolutionOptions,
        mutation_probability: f64,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Schedule>>
    where
        C: Challenge + ?Sized;
}

pub use timetable::TimetableBreedStrategy;
