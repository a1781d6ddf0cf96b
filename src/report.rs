//! # TimetableReport
//!
//! A rendering-ready view of a finished schedule: one [`ScheduledClass`] per
//! event with wall-clock times, a per-slot occupant lookup, the score and
//! the parameters of the run that produced it.
//!
//! Class times are stored in minutes from the start of the working day;
//! [`fmt::Display`] adds the catalog's day start and prints `HH:MM`.
//!
//! ## Example
//!
//! ```rust
//! use timetabler::catalog::EventCatalog;
//! use timetabler::evolution::EvolutionOptions;
//! use timetabler::fitness::{Challenge, FitnessEvaluator};
//! use timetabler::report::TimetableReport;
//! use timetabler::schedule::Schedule;
//!
//! let catalog = EventCatalog::builder()
//!     .rooms(["A"])
//!     .days(["Monday"])
//!     .event("Algebra", 4)
//!     .build()
//!     .unwrap();
//! let mut schedule = Schedule::from_starts(&catalog, &[4]).unwrap();
//! FitnessEvaluator::new(&catalog).evaluate(&mut schedule);
//!
//! let report = TimetableReport::new(&catalog, &schedule, &EvolutionOptions::default());
//! assert_eq!(report.classes[0].start_minutes, 60);
//! assert_eq!(report.occupant(0, 0, 5), Some(0));
//! assert!(report.to_string().contains("08:00-09:00  Algebra"));
//! ```
use std::fmt;

use crate::catalog::{EventCatalog, EventId, SLOT_MINUTES};
use crate::evolution::options::{EvolutionOptions, MutationTier};
use crate::schedule::{Schedule, WeekLayout};

/// One placed event.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledClass {
    pub event: EventId,
    pub name: String,
    pub day: usize,
    pub room: usize,
    /// Minutes from the start of the working day.
    pub start_minutes: u32,
    pub end_minutes: u32,
}

/// Parameters of the run, kept for display and audit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub population_size: usize,
    pub num_offspring: usize,
    pub max_generations: usize,
    pub elite_fraction: f64,
    pub mutation_schedule: Vec<MutationTier>,
    pub target_fitness: Option<f64>,
    pub stopping_tolerance: f64,
    pub placement_attempts: usize,
    pub seed: Option<u64>,
}

impl From<&EvolutionOptions> for RunParameters {
    fn from(options: &EvolutionOptions) -> Self {
        Self {
            population_size: options.get_population_size(),
            num_offspring: options.get_num_offspring(),
            max_generations: options.get_num_generations(),
            elite_fraction: options.get_elite_fraction(),
            mutation_schedule: options.get_mutation_schedule().tiers().to_vec(),
            target_fitness: options.get_target_fitness(),
            stopping_tolerance: options.get_stopping_tolerance(),
            placement_attempts: options.get_placement_attempts(),
            seed: options.get_seed(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableReport {
    /// Placed events ordered by event id.
    pub classes: Vec<ScheduledClass>,
    pub fitness: f64,
    /// True when every event is placed and no slot is shared.
    pub valid: bool,
    pub overlaps: usize,
    pub days: Vec<String>,
    pub rooms: Vec<String>,
    pub day_start_minutes: u32,
    pub parameters: RunParameters,
    layout: WeekLayout,
    occupancy: Vec<Vec<EventId>>,
}

impl TimetableReport {
    pub fn new(catalog: &EventCatalog, schedule: &Schedule, options: &EvolutionOptions) -> Self {
        let layout = *schedule.layout();
        let classes = schedule
            .placements()
            .map(|(event, start)| {
                let position = layout.locate(start);
                let start_minutes = position.offset as u32 * SLOT_MINUTES;
                ScheduledClass {
                    event,
                    name: catalog.event(event).name.clone(),
                    day: position.day,
                    room: position.room,
                    start_minutes,
                    end_minutes: start_minutes + schedule.duration(event) as u32 * SLOT_MINUTES,
                }
            })
            .collect();
        let occupancy = (0..schedule.total_slots())
            .map(|slot| schedule.occupants(slot).to_vec())
            .collect();

        Self {
            classes,
            fitness: schedule.fitness(),
            valid: schedule.is_complete() && !schedule.has_overlap(),
            overlaps: schedule.overlap_count(),
            days: catalog.days().to_vec(),
            rooms: catalog.rooms().to_vec(),
            day_start_minutes: catalog.day_start_minutes(),
            parameters: RunParameters::from(options),
            layout,
            occupancy,
        }
    }

    /// All events occupying a slot; empty when the slot is free or out of range.
    pub fn occupants(&self, day: usize, room: usize, offset: usize) -> &[EventId] {
        if day >= self.layout.days()
            || room >= self.layout.rooms()
            || offset >= self.layout.slots_per_day()
        {
            return &[];
        }
        let slot = self.layout.slot_index(day, room, offset);
        self.occupancy.get(slot).map_or(&[], Vec::as_slice)
    }

    /// The event occupying a slot, if any. With overlaps, the first one
    /// placed is returned.
    pub fn occupant(&self, day: usize, room: usize, offset: usize) -> Option<EventId> {
        self.occupants(day, room, offset).first().copied()
    }

    /// Classes held in one room on one day, earliest first.
    pub fn classes_in(&self, day: usize, room: usize) -> Vec<&ScheduledClass> {
        let mut classes: Vec<&ScheduledClass> = self
            .classes
            .iter()
            .filter(|class| class.day == day && class.room == room)
            .collect();
        classes.sort_by_key(|class| (class.start_minutes, class.event));
        classes
    }

    fn clock(&self, minutes: u32) -> String {
        let total = self.day_start_minutes + minutes;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

impl fmt::Display for TimetableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fitness: {} ({})",
            self.fitness,
            if self.valid {
                "valid".to_string()
            } else {
                format!("{} overlapping slots", self.overlaps)
            }
        )?;

        for (day, day_name) in self.days.iter().enumerate() {
            writeln!(f, "{}", day_name)?;
            for (room, room_name) in self.rooms.iter().enumerate() {
                let classes = self.classes_in(day, room);
                if classes.is_empty() {
                    continue;
                }
                writeln!(f, "  {}", room_name)?;
                for class in classes {
                    writeln!(
                        f,
                        "    {}-{}  {}",
                        self.clock(class.start_minutes),
                        self.clock(class.end_minutes),
                        class.name
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::{Challenge, FitnessEvaluator};

    fn catalog() -> EventCatalog {
        EventCatalog::builder()
            .rooms(["A", "B"])
            .days(["Monday", "Tuesday"])
            .event("Algebra", 4)
            .event("Physics lab", 6)
            .event("History", 2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_classes_and_lookup() {
        let catalog = catalog();
        let layout = WeekLayout::from_catalog(&catalog);
        let starts = [
            layout.slot_index(0, 0, 0),
            layout.slot_index(1, 1, 8),
            layout.slot_index(0, 0, 4),
        ];
        let mut schedule = Schedule::from_starts(&catalog, &starts).unwrap();
        FitnessEvaluator::new(&catalog).evaluate(&mut schedule);

        let report = TimetableReport::new(&catalog, &schedule, &EvolutionOptions::default());

        assert!(report.valid);
        assert_eq!(report.classes.len(), 3);
        assert_eq!(
            report.classes[1],
            ScheduledClass {
                event: 1,
                name: "Physics lab".to_string(),
                day: 1,
                room: 1,
                start_minutes: 120,
                end_minutes: 210,
            }
        );
        assert_eq!(report.occupant(1, 1, 13), Some(1));
        assert_eq!(report.occupant(1, 1, 14), None);
        assert_eq!(report.occupant(9, 0, 0), None);
        assert_eq!(report.parameters.population_size, 100);

        let ids: Vec<EventId> = report.classes_in(0, 0).iter().map(|c| c.event).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_display_lists_days_and_times() {
        let catalog = catalog();
        let layout = WeekLayout::from_catalog(&catalog);
        let starts = [
            layout.slot_index(0, 0, 0),
            layout.slot_index(1, 1, 8),
            layout.slot_index(0, 0, 4),
        ];
        let schedule = Schedule::from_starts(&catalog, &starts).unwrap();
        let report = TimetableReport::new(&catalog, &schedule, &EvolutionOptions::default());

        let text = report.to_string();
        assert!(text.contains("Monday\n  A\n    07:00-08:00  Algebra\n    08:00-08:30  History\n"));
        assert!(text.contains("Tuesday\n  B\n    09:00-10:30  Physics lab\n"));
    }

    #[test]
    fn test_overlap_reported() {
        let catalog = catalog();
        let schedule = Schedule::from_starts(&catalog, &[0, 1, 20]).unwrap();
        let report = TimetableReport::new(&catalog, &schedule, &EvolutionOptions::default());

        assert!(!report.valid);
        assert_eq!(report.overlaps, 3);
        assert_eq!(report.occupants(0, 0, 2), &[0, 1]);
    }
}
