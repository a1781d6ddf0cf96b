use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{Result, TimetableError};
use crate::rng::RandomNumberGenerator;
use crate::schedule::Schedule;

/// Trait for strategies that pick breeding parents from a population.
///
/// # Examples
///
/// ```
/// use timetabler::catalog::EventCatalog;
/// use timetabler::fitness::{Challenge, FitnessEvaluator};
/// use timetabler::rng::RandomNumberGenerator;
/// use timetabler::schedule::Schedule;
/// use timetabler::selection::{RankBiasedSelection, SelectionStrategy};
///
/// let catalog = EventCatalog::from_durations(1, 1, 48, &[4]).unwrap();
/// let evaluator = FitnessEvaluator::new(&catalog);
/// let mut population: Vec<Schedule> = [0, 10, 20]
///     .iter()
///     .map(|&start| Schedule::from_starts(&catalog, &[start]).unwrap())
///     .collect();
/// for schedule in &mut population {
///     evaluator.evaluate(schedule);
/// }
///
/// let mut rng = RandomNumberGenerator::from_seed(1);
/// let picked = RankBiasedSelection.select(&population, 2, &mut rng).unwrap();
/// assert_eq!(picked.len(), 2);
/// assert_ne!(picked[0], picked[1]);
/// ```
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Returns the indices of `num_to_select` distinct individuals, or of the
    /// whole population if it is smaller.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::EmptyPopulation` if the population is empty.
    fn select(
        &self,
        population: &[Schedule],
        num_to_select: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<usize>>;

    /// Picks two distinct parents. A population of one yields that
    /// individual twice.
    fn select_parents(
        &self,
        population: &[Schedule],
        rng: &mut RandomNumberGenerator,
    ) -> Result<(usize, usize)> {
        let picked = self.select(population, 2, rng)?;
        match picked.as_slice() {
            [first, second] => Ok((*first, *second)),
            [only] => Ok((*only, *only)),
            _ => Err(TimetableError::EmptyPopulation),
        }
    }
}

/// Orders two fitness values from best to worst, with NaN last.
pub fn compare_descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| {
        if a.is_nan() && b.is_nan() {
            Ordering::Equal
        } else if a.is_nan() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    })
}

/// Sorts schedules by cached fitness, best first.
pub fn sort_descending(population: &mut [Schedule]) {
    population.sort_by(|a, b| compare_descending(a.fitness(), b.fitness()));
}
