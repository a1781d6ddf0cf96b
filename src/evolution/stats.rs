use crate::error::{Result, TimetableError};
use crate::schedule::Schedule;

/// Fitness summary of one generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Generation index; 0 is the initial population.
    pub generation: usize,
    /// Mutation probability used to breed this generation.
    pub mutation_probability: f64,
    pub best: f64,
    pub mean: f64,
    pub median: f64,
    pub worst: f64,
}

impl GenerationStats {
    /// Summarizes a population sorted best first.
    pub fn from_sorted(
        generation: usize,
        mutation_probability: f64,
        population: &[Schedule],
    ) -> Result<Self> {
        let (first, last) = match (population.first(), population.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TimetableError::EmptyPopulation),
        };

        let len = population.len();
        let mean = population.iter().map(Schedule::fitness).sum::<f64>() / len as f64;
        let median = if len % 2 == 1 {
            population[len / 2].fitness()
        } else {
            (population[len / 2 - 1].fitness() + population[len / 2].fitness()) / 2.0
        };

        Ok(Self {
            generation,
            mutation_probability,
            best: first.fitness(),
            mean,
            median,
            worst: last.fitness(),
        })
    }
}
