//! # Fitness
//!
//! Scores a [`Schedule`]; higher is better. The score is a weighted sum of
//! two subscores:
//!
//! - **validity**: every event earns `boundary_credit` for a free (or absent)
//!   slot directly before its start and again for one directly after its
//!   end. Every slot an event shares with another event costs
//!   `overlap_penalty`.
//! - **spread**: every non-empty block earns the number of idle slots before
//!   its first class plus the number after its last class. Empty blocks
//!   earn nothing.
//!
//! ```text
//! fitness = validity + spread_weight * spread
//! ```
//!
//! The overlap penalty is derived from the catalog so that it exceeds the
//! largest possible positive score. Every overlap-free schedule therefore
//! scores at least zero and every overlapping one scores below zero.

use crate::catalog::EventCatalog;
use crate::error::{Result, TimetableError};
use crate::schedule::{Schedule, WeekLayout};

/// Scoring interface used by operators and the launcher.
pub trait Challenge: Send + Sync {
    /// Computes the fitness of a schedule without caching it.
    fn score(&self, schedule: &Schedule) -> f64;

    /// Computes the fitness and caches it on the schedule.
    fn evaluate(&self, schedule: &mut Schedule) -> f64 {
        let score = self.score(schedule);
        schedule.set_fitness(score);
        score
    }
}

/// Weights of the fitness terms.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    /// Awarded per free neighbour at either end of an event.
    pub boundary_credit: f64,
    /// Multiplier of the spread subscore.
    pub spread_weight: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            boundary_credit: 10.0,
            spread_weight: 1.0,
        }
    }
}

impl FitnessWeights {
    /// Checks that both weights are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("boundary_credit", self.boundary_credit),
            ("spread_weight", self.spread_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TimetableError::Configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// The individual terms behind a fitness value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    /// Free neighbours found across all events.
    pub boundary_credits: usize,
    /// `(event, slot)` pairs where the slot holds another event as well.
    pub shared_slots: usize,
    pub validity: f64,
    pub spread: f64,
    pub total: f64,
}

/// Fitness function for one catalog.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    layout: WeekLayout,
    weights: FitnessWeights,
    overlap_penalty: f64,
    upper_bound: f64,
}

impl FitnessEvaluator {
    /// Creates an evaluator with the default weights.
    pub fn new(catalog: &EventCatalog) -> Self {
        Self::build(catalog, FitnessWeights::default())
    }

    /// Creates an evaluator with custom weights.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` if a weight is negative or
    /// not finite.
    pub fn with_weights(catalog: &EventCatalog, weights: FitnessWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self::build(catalog, weights))
    }

    fn build(catalog: &EventCatalog, weights: FitnessWeights) -> Self {
        let layout = WeekLayout::from_catalog(catalog);
        let max_spread = (layout.block_count() * (layout.slots_per_day() - 1)) as f64;
        let upper_bound = 2.0 * weights.boundary_credit * catalog.len() as f64
            + weights.spread_weight * max_spread;

        Self {
            layout,
            weights,
            overlap_penalty: upper_bound + 1.0,
            upper_bound,
        }
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Cost of a single shared `(event, slot)` pair.
    pub fn overlap_penalty(&self) -> f64 {
        self.overlap_penalty
    }

    /// No schedule can score above this value.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Computes every fitness term of a schedule.
    pub fn breakdown(&self, schedule: &Schedule) -> FitnessBreakdown {
        let (boundary_credits, shared_slots) = self.validity_terms(schedule);
        let validity = boundary_credits as f64 * self.weights.boundary_credit
            - shared_slots as f64 * self.overlap_penalty;
        let spread = self.spread(schedule);

        FitnessBreakdown {
            boundary_credits,
            shared_slots,
            validity,
            spread,
            total: validity + self.weights.spread_weight * spread,
        }
    }

    fn validity_terms(&self, schedule: &Schedule) -> (usize, usize) {
        let slots_per_day = self.layout.slots_per_day();
        let mut credits = 0;
        let mut shared = 0;

        for (event, start) in schedule.placements() {
            let duration = schedule.duration(event);
            let offset = self.layout.offset_of(start);
            let end = start + duration;

            if offset == 0 || !schedule.is_occupied(start - 1) {
                credits += 1;
            }
            if offset + duration == slots_per_day || !schedule.is_occupied(end) {
                credits += 1;
            }
            shared += (start..end)
                .filter(|&slot| schedule.occupants(slot).len() > 1)
                .count();
        }

        (credits, shared)
    }

    fn spread(&self, schedule: &Schedule) -> f64 {
        let last_offset = self.layout.slots_per_day() - 1;

        (0..self.layout.block_count())
            .map(|block| {
                let range = self.layout.block_range(block);
                let base = range.start;
                let mut occupied = range.filter(|&slot| schedule.is_occupied(slot));
                match occupied.next() {
                    None => 0,
                    Some(first) => {
                        let last = occupied.last().unwrap_or(first);
                        (first - base) + (last_offset - (last - base))
                    }
                }
            })
            .sum::<usize>() as f64
    }
}

impl Challenge for FitnessEvaluator {
    fn score(&self, schedule: &Schedule) -> f64 {
        self.breakdown(schedule).total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_block(durations: &[usize]) -> EventCatalog {
        EventCatalog::from_durations(1, 1, 48, durations).unwrap()
    }

    #[test]
    fn test_validity_credits() {
        let catalog = one_block(&[2, 4, 1]);
        let evaluator = FitnessEvaluator::new(&catalog);
        let schedule = Schedule::from_starts(&catalog, &[0, 2, 6]).unwrap();

        let breakdown = evaluator.breakdown(&schedule);
        // Event 0 opens the day, event 2 is followed by an empty slot.
        assert_eq!(breakdown.boundary_credits, 2);
        assert_eq!(breakdown.shared_slots, 0);
        assert_eq!(breakdown.validity, 20.0);
    }

    #[test]
    fn test_spread_of_centered_block() {
        let catalog = one_block(&[4]);
        let evaluator = FitnessEvaluator::new(&catalog);
        let schedule = Schedule::from_starts(&catalog, &[10]).unwrap();

        // 10 idle slots before, 48 - 14 = 34 after.
        assert_eq!(evaluator.breakdown(&schedule).spread, 44.0);
    }

    #[test]
    fn test_empty_block_is_neutral() {
        let catalog = EventCatalog::from_durations(2, 1, 8, &[8]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog);
        let schedule = Schedule::from_starts(&catalog, &[0]).unwrap();

        // The full block has no idle edges and the empty block adds nothing.
        assert_eq!(evaluator.breakdown(&schedule).spread, 0.0);
    }

    #[test]
    fn test_overlap_dominates() {
        let catalog = one_block(&[2, 4, 1]);
        let evaluator = FitnessEvaluator::new(&catalog);

        // Worst spread without overlap: packed against the start of the day.
        let clean = Schedule::from_starts(&catalog, &[0, 2, 47]).unwrap();
        let overlapping = Schedule::from_starts(&catalog, &[20, 21, 30]).unwrap();

        let clean_score = evaluator.score(&clean);
        let overlapping_score = evaluator.score(&overlapping);
        assert!(clean_score >= 0.0);
        assert!(overlapping_score < 0.0);
        assert!(overlapping_score < clean_score);
    }

    #[test]
    fn test_evaluate_caches_and_is_idempotent() {
        let catalog = one_block(&[3, 3]);
        let evaluator = FitnessEvaluator::new(&catalog);
        let mut schedule = Schedule::from_starts(&catalog, &[5, 20]).unwrap();

        let first = evaluator.evaluate(&mut schedule);
        let second = evaluator.evaluate(&mut schedule);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(schedule.fitness().to_bits(), first.to_bits());
        assert!(schedule.is_scored());
    }

    #[test]
    fn test_upper_bound() {
        let catalog = EventCatalog::from_durations(2, 5, 48, &[1, 2, 3]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog);

        assert_eq!(evaluator.upper_bound(), 2.0 * 10.0 * 3.0 + 10.0 * 47.0);
        assert_eq!(evaluator.overlap_penalty(), evaluator.upper_bound() + 1.0);
    }

    #[test]
    fn test_invalid_weights() {
        let catalog = one_block(&[1]);
        let weights = FitnessWeights {
            boundary_credit: -1.0,
            spread_weight: 1.0,
        };
        assert!(matches!(
            FitnessEvaluator::with_weights(&catalog, weights),
            Err(TimetableError::Configuration(_))
        ));

        let weights = FitnessWeights {
            boundary_credit: 1.0,
            spread_weight: f64::NAN,
        };
        assert!(FitnessEvaluator::with_weights(&catalog, weights).is_err());
    }
}
