use crate::error::{Result, TimetableError};
use crate::rng::RandomNumberGenerator;
use crate::schedule::Schedule;
use crate::selection::selection_strategy::{compare_descending, SelectionStrategy};

/// Rank-biased stochastic parent selection.
///
/// The population is ranked best first and the individual at rank `i`
/// receives the weight `N - i`. Each individual then draws one uniform
/// number, multiplies it by its weight, and the largest products win. The
/// best individual is the most likely pick, but every individual keeps a
/// non-zero chance, so breeding does not collapse onto the top two.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct RankBiasedSelection;

impl SelectionStrategy for RankBiasedSelection {
    fn select(
        &self,
        population: &[Schedule],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<usize>> {
        if population.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }

        let size = population.len();
        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| {
            compare_descending(population[a].fitness(), population[b].fitness())
        });

        let draws = rng.fetch_uniform(0.0, 1.0, size);
        let mut keyed: Vec<(usize, f64)> = ranked
            .into_iter()
            .zip(draws)
            .enumerate()
            .map(|(rank, (idx, draw))| (idx, draw * (size - rank) as f64))
            .collect();
        keyed.sort_by(|a, b| compare_descending(a.1, b.1));

        Ok(keyed
            .into_iter()
            .take(num_to_select)
            .map(|(idx, _)| idx)
            .collect())
    }
}
