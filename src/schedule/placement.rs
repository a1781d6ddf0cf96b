//! Bounded search for a free start slot.
//!
//! Every operator that needs to put an event somewhere (initialization,
//! crossover repair, mutation) goes through [`BoundedPlacementSearch`]: a
//! fixed number of random probes for a span of empty slots, then a forced
//! placement that accepts overlap. The search never fails; the outcome says
//! whether the slot was actually free.

use tracing::trace;

use super::Schedule;
use crate::rng::RandomNumberGenerator;

/// Result of a placement search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The span starting here was empty.
    Free(usize),
    /// No empty span was found in time; the event overlaps whatever is here.
    Forced(usize),
}

impl PlacementOutcome {
    pub fn start(self) -> usize {
        match self {
            PlacementOutcome::Free(start) | PlacementOutcome::Forced(start) => start,
        }
    }

    pub fn is_forced(self) -> bool {
        matches!(self, PlacementOutcome::Forced(_))
    }
}

/// Random probing for a free span, bounded by `max_attempts`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPlacementSearch {
    max_attempts: usize,
}

impl BoundedPlacementSearch {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Looks for a start anywhere in the week, choosing a fresh block on
    /// every probe.
    ///
    /// `exclude` names a start that must not be returned unless it is the
    /// only possible one; mutation uses it to guarantee an actual move.
    pub fn find_in_any_block(
        &self,
        schedule: &Schedule,
        duration: usize,
        exclude: Option<usize>,
        rng: &mut RandomNumberGenerator,
    ) -> PlacementOutcome {
        let blocks = schedule.layout().block_count();
        self.search(schedule, duration, exclude, rng, |rng| rng.gen_index(blocks))
    }

    /// Looks for a start inside a single block.
    pub fn find_in_block(
        &self,
        schedule: &Schedule,
        block: usize,
        duration: usize,
        exclude: Option<usize>,
        rng: &mut RandomNumberGenerator,
    ) -> PlacementOutcome {
        self.search(schedule, duration, exclude, rng, |_| block)
    }

    fn search<F>(
        &self,
        schedule: &Schedule,
        duration: usize,
        exclude: Option<usize>,
        rng: &mut RandomNumberGenerator,
        mut pick_block: F,
    ) -> PlacementOutcome
    where
        F: FnMut(&mut RandomNumberGenerator) -> usize,
    {
        let layout = *schedule.layout();
        let offsets = layout.start_offsets(duration);
        let mut last = None;

        for _ in 0..self.max_attempts {
            let start = layout.block_start(pick_block(rng)) + rng.gen_index(offsets);
            if Some(start) == exclude {
                continue;
            }
            if schedule.is_free(start, duration) {
                return PlacementOutcome::Free(start);
            }
            last = Some(start);
        }

        let start = last.unwrap_or_else(|| {
            let start = layout.block_start(pick_block(rng)) + rng.gen_index(offsets);
            match exclude {
                // Step to a neighbouring offset in the same block.
                Some(excluded) if excluded == start && offsets > 1 => {
                    if layout.offset_of(start) + 1 < offsets {
                        start + 1
                    } else {
                        start - 1
                    }
                }
                _ => start,
            }
        });

        trace!(duration, start, "placement search exhausted, forcing overlap");
        PlacementOutcome::Forced(start)
    }
}

impl Default for BoundedPlacementSearch {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}
