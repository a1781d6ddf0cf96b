use crate::error::{Result, TimetableError};
use crate::schedule::Schedule;
use crate::selection::selection_strategy::sort_descending;

/// Elitist survivor selection.
///
/// The best `elite_fraction` of the parents survive unconditionally and the
/// rest of the next population is filled with the best children. Elitism
/// keeps the best known schedule from being lost between generations.
///
/// # Examples
///
/// ```
/// use timetabler::selection::ElitistSelection;
///
/// let selection = ElitistSelection::new(0.2).unwrap();
/// assert_eq!(selection.elite_count(100), 20);
/// assert!(ElitistSelection::new(1.5).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElitistSelection {
    elite_fraction: f64,
}

impl ElitistSelection {
    /// Creates a new ElitistSelection strategy.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` if `elite_fraction` is not
    /// within `[0, 1]`.
    pub fn new(elite_fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&elite_fraction) {
            return Err(TimetableError::Configuration(format!(
                "Elite fraction must be in the range [0, 1], got {}",
                elite_fraction
            )));
        }
        Ok(Self { elite_fraction })
    }

    pub fn elite_fraction(&self) -> f64 {
        self.elite_fraction
    }

    /// Number of parents kept for a population of `population_size`.
    pub fn elite_count(&self, population_size: usize) -> usize {
        ((self.elite_fraction * population_size as f64).round() as usize).min(population_size)
    }

    /// Builds the next population from the current parents and a child pool.
    ///
    /// Both inputs are sorted independently; the result holds the elite
    /// parents and the best children and is itself sorted best first. If
    /// the child pool is too small, the remaining places go to the next best
    /// parents.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::EmptyPopulation` if parents and children are
    /// both empty.
    pub fn merge(
        &self,
        mut parents: Vec<Schedule>,
        mut children: Vec<Schedule>,
        population_size: usize,
    ) -> Result<Vec<Schedule>> {
        if parents.is_empty() && children.is_empty() {
            return Err(TimetableError::EmptyPopulation);
        }

        sort_descending(&mut parents);
        sort_descending(&mut children);

        let elites = self.elite_count(population_size).min(parents.len());
        let mut next: Vec<Schedule> = parents.drain(..elites).collect();

        children.truncate(population_size - elites);
        next.extend(children);

        let missing = population_size.saturating_sub(next.len());
        next.extend(parents.into_iter().take(missing));

        sort_descending(&mut next);
        Ok(next)
    }
}

impl Default for ElitistSelection {
    fn default() -> Self {
        Self {
            elite_fraction: 0.2,
        }
    }
}
