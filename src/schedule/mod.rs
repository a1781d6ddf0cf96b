//! # Schedule
//!
//! A [`Schedule`] is one candidate timetable and the unit of evolution. It
//! keeps two views of the same assignment in step:
//!
//! - a flat grid of slots, each holding the set of events that currently
//!   occupy it (several events in one slot is a legal, penalized state);
//! - a dense placement table mapping every event id to its start slot.
//!
//! Every change goes through one internal place/unplace pair that updates
//! both views together and drops the cached fitness. From outside the crate
//! a schedule is built with [`Schedule::from_starts`] or
//! [`Schedule::random`] and changed with [`Schedule::move_event`], all of
//! which reject starts that would leave a block.
//!
//! ```rust
//! use timetabler::catalog::EventCatalog;
//! use timetabler::schedule::Schedule;
//!
//! let catalog = EventCatalog::from_durations(1, 1, 48, &[2, 4, 1]).unwrap();
//! let schedule = Schedule::from_starts(&catalog, &[0, 2, 6]).unwrap();
//!
//! assert_eq!(schedule.occupants(3), &[1]);
//! assert!(!schedule.has_overlap());
//! ```

pub mod layout;
pub mod placement;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::catalog::{EventCatalog, EventId};
use crate::error::{Result, TimetableError};
use crate::rng::RandomNumberGenerator;

pub use layout::{SlotPosition, WeekLayout};
pub use placement::{BoundedPlacementSearch, PlacementOutcome};

/// Events occupying a single slot. Overlap is rare, so two inline entries
/// avoid a heap allocation for almost every slot.
pub type Occupants = SmallVec<[EventId; 2]>;

/// A candidate weekly timetable.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Schedule {
    layout: WeekLayout,
    durations: Arc<[usize]>,
    grid: Vec<Occupants>,
    placement: Vec<Option<usize>>,
    fitness: Option<f64>,
}

impl Schedule {
    /// Creates a schedule with no event placed. Only operators that go on to
    /// place every event should start from here.
    pub(crate) fn empty(catalog: &EventCatalog) -> Self {
        let layout = WeekLayout::from_catalog(catalog);
        Self {
            layout,
            durations: catalog.shared_durations(),
            grid: vec![Occupants::new(); layout.total_slots()],
            placement: vec![None; catalog.len()],
            fitness: None,
        }
    }

    /// Creates an empty schedule sharing the dimensions of `other`.
    pub(crate) fn empty_like(other: &Schedule) -> Self {
        Self {
            layout: other.layout,
            durations: Arc::clone(&other.durations),
            grid: vec![Occupants::new(); other.grid.len()],
            placement: vec![None; other.placement.len()],
            fitness: None,
        }
    }

    /// Builds a schedule from explicit start slots, one per event.
    ///
    /// Starts may overlap; they must each keep their event inside one block.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::MalformedInput` if the number of starts does
    /// not match the catalog or an event would leave its block.
    pub fn from_starts(catalog: &EventCatalog, starts: &[usize]) -> Result<Self> {
        if starts.len() != catalog.len() {
            return Err(TimetableError::MalformedInput(format!(
                "expected {} start slots, got {}",
                catalog.len(),
                starts.len()
            )));
        }

        let mut schedule = Self::empty(catalog);
        for (event, &start) in starts.iter().enumerate() {
            if !schedule.layout.fits(start, catalog.duration(event)) {
                return Err(TimetableError::MalformedInput(format!(
                    "event {} cannot start at slot {}",
                    event, start
                )));
            }
            schedule.place(event, start);
        }
        Ok(schedule)
    }

    /// Randomized initialization.
    ///
    /// Events are placed in catalog order, each into a uniformly chosen
    /// block, preferring free slots and falling back to a forced placement
    /// when the search is exhausted. The result is complete but unscored.
    pub fn random(
        catalog: &EventCatalog,
        search: &BoundedPlacementSearch,
        rng: &mut RandomNumberGenerator,
    ) -> Self {
        let mut schedule = Self::empty(catalog);
        for event in 0..catalog.len() {
            let outcome = search.find_in_any_block(&schedule, catalog.duration(event), None, rng);
            schedule.place(event, outcome.start());
        }
        schedule
    }

    pub fn layout(&self) -> &WeekLayout {
        &self.layout
    }

    pub fn durations(&self) -> &[usize] {
        &self.durations
    }

    pub fn duration(&self, event: EventId) -> usize {
        self.durations[event]
    }

    pub fn event_count(&self) -> usize {
        self.placement.len()
    }

    pub fn total_slots(&self) -> usize {
        self.grid.len()
    }

    /// Start slot of an event, or `None` while it is being moved.
    pub fn start_of(&self, event: EventId) -> Option<usize> {
        self.placement[event]
    }

    /// Iterates over `(event, start)` for every placed event.
    pub fn placements(&self) -> impl Iterator<Item = (EventId, usize)> + '_ {
        self.placement
            .iter()
            .enumerate()
            .filter_map(|(event, start)| start.map(|s| (event, s)))
    }

    /// Events occupying a slot.
    pub fn occupants(&self, slot: usize) -> &[EventId] {
        &self.grid[slot]
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        !self.grid[slot].is_empty()
    }

    /// Whether every slot of `[start, start + duration)` is empty.
    pub fn is_free(&self, start: usize, duration: usize) -> bool {
        self.grid[start..start + duration].iter().all(|s| s.is_empty())
    }

    /// Whether every event has a placement.
    pub fn is_complete(&self) -> bool {
        self.placement.iter().all(Option::is_some)
    }

    /// Number of slots occupied by more than one event.
    pub fn overlap_count(&self) -> usize {
        self.grid.iter().filter(|s| s.len() > 1).count()
    }

    pub fn has_overlap(&self) -> bool {
        self.grid.iter().any(|s| s.len() > 1)
    }

    /// Cached fitness, or negative infinity if the schedule has changed since
    /// it was last scored.
    pub fn fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn is_scored(&self) -> bool {
        self.fitness.is_some()
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Places an unplaced event at `start`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the event is already placed or would cross
    /// a block boundary.
    pub(crate) fn place(&mut self, event: EventId, start: usize) {
        let duration = self.durations[event];
        debug_assert!(self.placement[event].is_none(), "event {} placed twice", event);
        debug_assert!(self.layout.fits(start, duration), "event {} leaves its block", event);

        for slot in &mut self.grid[start..start + duration] {
            slot.push(event);
        }
        self.placement[event] = Some(start);
        self.fitness = None;
    }

    /// Removes an event from the grid and returns its former start.
    pub(crate) fn unplace(&mut self, event: EventId) -> Option<usize> {
        let start = self.placement[event].take()?;
        let duration = self.durations[event];
        for slot in &mut self.grid[start..start + duration] {
            if let Some(pos) = slot.iter().position(|&e| e == event) {
                slot.swap_remove(pos);
            }
        }
        self.fitness = None;
        Some(start)
    }

    /// Moves an event to a new start slot, placing it if it was unplaced.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::MalformedInput` and leaves the schedule
    /// untouched if the event is unknown or would leave its block.
    pub fn move_event(&mut self, event: EventId, start: usize) -> Result<()> {
        let duration = self.durations.get(event).copied().ok_or_else(|| {
            TimetableError::MalformedInput(format!("unknown event {}", event))
        })?;
        if !self.layout.fits(start, duration) {
            return Err(TimetableError::MalformedInput(format!(
                "event {} cannot start at slot {}",
                event, start
            )));
        }
        self.unplace(event);
        self.place(event, start);
        Ok(())
    }

    /// Checks that the grid and the placement table describe the same
    /// assignment: each placed event occupies exactly its own span, and
    /// nothing else appears in the grid.
    pub fn is_consistent(&self) -> bool {
        let mut expected = vec![0usize; self.grid.len()];
        for (event, start) in self.placements() {
            let duration = self.durations[event];
            if !self.layout.fits(start, duration) {
                return false;
            }
            for slot in start..start + duration {
                if !self.grid[slot].contains(&event) {
                    return false;
                }
                expected[slot] += 1;
            }
        }
        self.grid
            .iter()
            .zip(expected)
            .all(|(slot, count)| slot.len() == count)
    }
}
