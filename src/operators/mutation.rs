//! Mutation of a single schedule.
//!
//! A mutation either leaves the schedule alone (the probability draw failed)
//! or runs a batch of perturbations, each of which is one of:
//!
//! - **relocate**: lift an event out of the grid and search for a new start,
//!   either inside its current block (local move) or anywhere in the week
//!   (global move);
//! - **swap**: exchange the start slots of two events, provided both still
//!   fit inside their new blocks. A swap that would push an event across a
//!   block boundary is skipped.
//!
//! The schedule is rescored in both cases, because freshly built children
//! arrive here unscored.

use crate::catalog::EventId;
use crate::error::{Result, TimetableError};
use crate::fitness::Challenge;
use crate::rng::RandomNumberGenerator;
use crate::schedule::{BoundedPlacementSearch, PlacementOutcome, Schedule};

/// What a call to [`MutationOperator::mutate`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationReport {
    /// Whether the probability draw triggered a batch.
    pub applied: bool,
    pub relocations: usize,
    pub swaps: usize,
    /// Swaps skipped because an event would leave its block.
    pub aborted_swaps: usize,
}

/// Batch mutation operator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct MutationOperator {
    min_batch_fraction: f64,
    max_batch_fraction: f64,
    local_move_probability: f64,
    swap_probability: f64,
    search: BoundedPlacementSearch,
}

impl Default for MutationOperator {
    fn default() -> Self {
        Self {
            min_batch_fraction: 1.0 / 16.0,
            max_batch_fraction: 1.0 / 3.0,
            local_move_probability: 0.5,
            swap_probability: 0.3,
            search: BoundedPlacementSearch::default(),
        }
    }
}

impl MutationOperator {
    pub fn new(search: BoundedPlacementSearch) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    /// Sets the bounds of the batch size as fractions of the event count.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::Configuration` unless
    /// `0 <= min <= max <= 1`.
    pub fn with_batch_fractions(mut self, min: f64, max: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(TimetableError::Configuration(format!(
                "batch fractions must satisfy 0 <= min <= max <= 1, got {} and {}",
                min, max
            )));
        }
        self.min_batch_fraction = min;
        self.max_batch_fraction = max;
        Ok(self)
    }

    /// Sets the chance that a perturbation is a swap rather than a relocation.
    pub fn with_swap_probability(mut self, probability: f64) -> Result<Self> {
        self.swap_probability = checked_probability("swap_probability", probability)?;
        Ok(self)
    }

    /// Sets the chance that a relocation stays inside the event's block.
    pub fn with_local_move_probability(mut self, probability: f64) -> Result<Self> {
        self.local_move_probability = checked_probability("local_move_probability", probability)?;
        Ok(self)
    }

    pub fn search(&self) -> &BoundedPlacementSearch {
        &self.search
    }

    /// Number of perturbations for a schedule of `events` events.
    pub fn batch_bounds(&self, events: usize) -> (usize, usize) {
        let min = ((events as f64 * self.min_batch_fraction).ceil() as usize).max(1);
        let max = ((events as f64 * self.max_batch_fraction).floor() as usize).max(min);
        (min, max)
    }

    /// Mutates `schedule` with the given probability and rescores it.
    pub fn mutate<C>(
        &self,
        schedule: &mut Schedule,
        probability: f64,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) -> MutationReport
    where
        C: Challenge + ?Sized,
    {
        let mut report = MutationReport::default();
        let events = schedule.event_count();

        if events > 0 && rng.gen_probability() < probability {
            report.applied = true;
            let (min, max) = self.batch_bounds(events);
            let batch = rng.gen_range(min..=max);

            for _ in 0..batch {
                let event = rng.gen_index(events);
                if events > 1 && rng.gen_probability() < self.swap_probability {
                    let mut other = rng.gen_index(events - 1);
                    if other >= event {
                        other += 1;
                    }
                    if self.swap(schedule, event, other) {
                        report.swaps += 1;
                    } else {
                        report.aborted_swaps += 1;
                    }
                } else {
                    let local = rng.gen_probability() < self.local_move_probability;
                    self.relocate(schedule, event, local, rng);
                    report.relocations += 1;
                }
            }
        }

        challenge.evaluate(schedule);
        report
    }

    /// Moves an event to a new start, never back onto its old one when
    /// another start is available.
    pub fn relocate(
        &self,
        schedule: &mut Schedule,
        event: EventId,
        local: bool,
        rng: &mut RandomNumberGenerator,
    ) -> PlacementOutcome {
        let duration = schedule.duration(event);
        let old = schedule.unplace(event);

        let outcome = match old {
            Some(start) if local => {
                let block = schedule.layout().block_of(start);
                self.search
                    .find_in_block(schedule, block, duration, Some(start), rng)
            }
            _ => self.search.find_in_any_block(schedule, duration, old, rng),
        };

        schedule.place(event, outcome.start());
        outcome
    }

    /// Exchanges the starts of two events. Returns `false` and leaves the
    /// schedule untouched if either event would cross a block boundary.
    pub fn swap(&self, schedule: &mut Schedule, a: EventId, b: EventId) -> bool {
        let (Some(start_a), Some(start_b)) = (schedule.start_of(a), schedule.start_of(b)) else {
            return false;
        };
        let layout = *schedule.layout();
        if a == b
            || !layout.fits(start_b, schedule.duration(a))
            || !layout.fits(start_a, schedule.duration(b))
        {
            return false;
        }

        schedule.unplace(a);
        schedule.unplace(b);
        schedule.place(a, start_b);
        schedule.place(b, start_a);
        true
    }
}

fn checked_probability(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TimetableError::Configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
