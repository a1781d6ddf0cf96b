//! # TimetableBreedStrategy
//!
//! Breeds a generation's child pool. Parent pairs are picked by a
//! [`SelectionStrategy`], each pair is crossed over, both children are
//! mutated and scored, and pairs are produced until the pool is full.
//!
//! Parent picks and one seed per pair are drawn up front on the calling
//! thread. The pairs themselves are then bred independently, in parallel
//! when there are enough of them, each with a generator built from its own
//! seed. The pool is identical for a given seed however rayon schedules
//! the work.
use rayon::prelude::*;

use super::BreedStrategy;
use crate::{
    error::{Result, TimetableError},
    evolution::options::EvolutionOptions,
    fitness::Challenge,
    operators::{CrossoverOperator, MutationOperator},
    rng::RandomNumberGenerator,
    schedule::{BoundedPlacementSearch, Schedule},
    selection::{RankBiasedSelection, SelectionStrategy},
};

#[derive(Debug, Clone)]
pub struct TimetableBreedStrategy<S = RankBiasedSelection>
where
    S: SelectionStrategy + Clone,
{
    selection: S,
    crossover: CrossoverOperator,
    mutation: MutationOperator,
}

impl TimetableBreedStrategy<RankBiasedSelection> {
    /// Creates a strategy with rank-biased parent selection and default
    /// operators sharing the given placement search.
    pub fn new(search: BoundedPlacementSearch) -> Self {
        Self::with_operators(
            RankBiasedSelection,
            CrossoverOperator::new(search),
            MutationOperator::new(search),
        )
    }
}

impl Default for TimetableBreedStrategy<RankBiasedSelection> {
    fn default() -> Self {
        Self::new(BoundedPlacementSearch::default())
    }
}

impl<S> TimetableBreedStrategy<S>
where
    S: SelectionStrategy + Clone,
{
    pub fn with_operators(
        selection: S,
        crossover: CrossoverOperator,
        mutation: MutationOperator,
    ) -> Self {
        Self {
            selection,
            crossover,
            mutation,
        }
    }

    pub fn mutation(&self) -> &MutationOperator {
        &self.mutation
    }

    pub fn crossover(&self) -> &CrossoverOperator {
        &self.crossover
    }
}

impl<S> BreedStrategy for TimetableBreedStrategy<S>
where
    S: SelectionStrategy + Clone,
{
    fn breed<C>(
        &self,
        population: &[Schedule],
        evol_options: &EvolutionOptions,
        mutation_probability: f64,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Schedule>>
    where
        C: Challenge + ?Sized,
    {
        if population.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }

        let num_offspring = evol_options.get_num_offspring();
        let jobs = (0..num_offspring.div_ceil(2))
            .map(|_| {
                let (first, second) = self.selection.select_parents(population, rng)?;
                Ok((first, second, rng.next_seed()))
            })
            .collect::<Result<Vec<(usize, usize, u64)>>>()?;

        let breed_pair = |&(first, second, seed): &(usize, usize, u64)| {
            let mut rng = RandomNumberGenerator::from_seed(seed);
            self.crossover.offspring(
                &population[first],
                &population[second],
                &self.mutation,
                mutation_probability,
                challenge,
                &mut rng,
            )
        };

        let pairs: Vec<(Schedule, Schedule)> =
            if jobs.len() >= evol_options.get_parallel_threshold() {
                jobs.par_iter().map(breed_pair).collect()
            } else {
                jobs.iter().map(breed_pair).collect()
            };

        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (one, two) in pairs {
            children.push(one);
            children.push(two);
        }
        children.truncate(num_offspring);

        Ok(children)
    }
}
