//! # Event Catalog
//!
//! The catalog is the read-only description of the week that a search runs
//! against: the events to place (each with a duration counted in 15-minute
//! slots), the room labels, the day labels and the length of the daily
//! window. It is validated once at construction, so every other part of the
//! engine can assume positive durations that fit within a single day.
//!
//! Catalogs are usually built with [`EventCatalog::builder`] or parsed from
//! the plain-text format:
//!
//! ```text
//! rooms: A, B, C
//! events(name, duration):
//! Algebra - Lecture, 90
//! Algebra - Exercises 1, 120
//! ```
//!
//! Durations in the text format are given in minutes and are truncated to
//! whole slots.
//!
//! ```rust
//! use timetabler::catalog::EventCatalog;
//!
//! let text = "rooms: A, B\nevents(name, duration):\nAlgebra, 90\nPhysics, 60\n";
//! let catalog = EventCatalog::parse(text).unwrap();
//!
//! assert_eq!(catalog.room_count(), 2);
//! assert_eq!(catalog.duration(0), 6);
//! assert_eq!(catalog.duration(1), 4);
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, ResultExt, TimetableError};

/// Length of one slot in minutes.
pub const SLOT_MINUTES: u32 = 15;

/// Slots in the default daily window (12 hours).
pub const DEFAULT_SLOTS_PER_DAY: usize = 48;

/// Default start of the daily window, in minutes after midnight (07:00).
pub const DEFAULT_DAY_START_MINUTES: u32 = 7 * 60;

/// The five working days used when no day labels are given.
pub const DEFAULT_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Dense index of an event inside its catalog.
pub type EventId = usize;

/// A single lecture or lab.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Duration in slots.
    pub duration: usize,
}

/// The immutable set of events, rooms and days a search is run against.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EventCatalog {
    events: Vec<Event>,
    durations: Arc<[usize]>,
    rooms: Vec<String>,
    days: Vec<String>,
    slots_per_day: usize,
    day_start_minutes: u32,
}

impl EventCatalog {
    /// Returns a builder for creating an `EventCatalog`.
    pub fn builder() -> EventCatalogBuilder {
        EventCatalogBuilder::default()
    }

    /// Builds a catalog of anonymous events from their durations.
    ///
    /// Events are named `Event 0`, `Event 1` and so on; rooms are labelled
    /// `Room 0`, `Room 1`. Mostly useful for tests and benchmarks.
    pub fn from_durations(
        rooms: usize,
        days: usize,
        slots_per_day: usize,
        durations: &[usize],
    ) -> Result<Self> {
        let mut builder = Self::builder()
            .rooms((0..rooms).map(|r| format!("Room {}", r)))
            .days((0..days).map(|d| {
                DEFAULT_DAYS
                    .get(d)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("Day {}", d))
            }))
            .slots_per_day(slots_per_day);
        for (i, &duration) in durations.iter().enumerate() {
            builder = builder.event(format!("Event {}", i), duration);
        }
        builder.build()
    }

    /// Parses the plain-text catalog format.
    ///
    /// The first line lists the rooms after a `rooms:` prefix, the second line
    /// is a header and every following non-blank line is `name, minutes`.
    /// The duration is taken from after the last comma so names may contain
    /// commas themselves.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate();

        let (_, first) = lines.next().ok_or_else(|| TimetableError::Parse {
            line: 1,
            message: "catalog is empty".to_string(),
        })?;
        let rooms = first
            .trim()
            .split_once(':')
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rooms"))
            .map(|(_, list)| list)
            .ok_or_else(|| TimetableError::Parse {
                line: 1,
                message: "expected a `rooms:` line".to_string(),
            })?;

        let mut builder = Self::builder().rooms(
            rooms
                .split(',')
                .map(str::trim)
                .filter(|room| !room.is_empty())
                .map(str::to_string),
        );

        // Header line describing the event columns.
        lines.next();

        for (index, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = index + 1;
            let (name, minutes) = line.rsplit_once(',').ok_or_else(|| TimetableError::Parse {
                line: line_no,
                message: format!("expected `name, minutes`, got `{}`", line),
            })?;
            let minutes: u32 = minutes.trim().parse().map_err(|_| TimetableError::Parse {
                line: line_no,
                message: format!("invalid duration `{}`", minutes.trim()),
            })?;
            builder = builder.event(name.trim(), (minutes / SLOT_MINUTES) as usize);
        }

        builder.build()
    }

    /// Reads and parses a catalog file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read catalog {}", path.display()))?;
        Self::parse(&text)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id]
    }

    /// Duration of an event in slots.
    pub fn duration(&self, id: EventId) -> usize {
        self.durations[id]
    }

    /// Durations of all events, indexed by event id.
    pub fn durations(&self) -> &[usize] {
        &self.durations
    }

    /// Shared handle to the durations table, handed to every genome.
    pub fn shared_durations(&self) -> Arc<[usize]> {
        Arc::clone(&self.durations)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn slots_per_day(&self) -> usize {
        self.slots_per_day
    }

    /// Start of the daily window in minutes after midnight.
    pub fn day_start_minutes(&self) -> u32 {
        self.day_start_minutes
    }

    /// Sum of all event durations in slots.
    pub fn total_duration(&self) -> usize {
        self.durations.iter().sum()
    }

    /// Checks that the catalog describes a week every event fits into.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::MalformedInput` if there are no rooms, no
    /// days, no slots per day, no events, an event whose duration is zero or
    /// longer than a day, or event ids and durations out of step with the
    /// event list.
    pub fn validate(&self) -> Result<()> {
        if self.rooms.is_empty() {
            return Err(TimetableError::MalformedInput(
                "catalog must contain at least one room".to_string(),
            ));
        }
        if self.days.is_empty() {
            return Err(TimetableError::MalformedInput(
                "catalog must contain at least one day".to_string(),
            ));
        }
        if self.slots_per_day == 0 {
            return Err(TimetableError::MalformedInput(
                "a day must contain at least one slot".to_string(),
            ));
        }
        if self.events.is_empty() {
            return Err(TimetableError::MalformedInput(
                "catalog must contain at least one event".to_string(),
            ));
        }
        if self.durations.len() != self.events.len() {
            return Err(TimetableError::MalformedInput(format!(
                "{} durations for {} events",
                self.durations.len(),
                self.events.len()
            )));
        }

        let paired = self.events.iter().zip(self.durations.iter());
        for (index, (event, &duration)) in paired.enumerate() {
            if event.id != index || event.duration != duration {
                return Err(TimetableError::MalformedInput(format!(
                    "event `{}` is out of step with its position {}",
                    event.name, index
                )));
            }
            if duration == 0 {
                return Err(TimetableError::MalformedInput(format!(
                    "event `{}` has a non-positive duration",
                    event.name
                )));
            }
            if duration > self.slots_per_day {
                return Err(TimetableError::MalformedInput(format!(
                    "event `{}` lasts {} slots but a day has only {}",
                    event.name, duration, self.slots_per_day
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `EventCatalog`.
///
/// Validation happens in [`EventCatalogBuilder::build`]; a catalog that
/// passes it can never produce a genome with an unplaceable event.
#[derive(Debug, Clone, Default)]
pub struct EventCatalogBuilder {
    events: Vec<(String, usize)>,
    rooms: Vec<String>,
    days: Option<Vec<String>>,
    slots_per_day: Option<usize>,
    day_start_minutes: Option<u32>,
}

impl EventCatalogBuilder {
    /// Appends an event with the given duration in slots.
    pub fn event<S: Into<String>>(mut self, name: S, duration: usize) -> Self {
        self.events.push((name.into(), duration));
        self
    }

    /// Sets the room labels.
    pub fn rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the day labels. Defaults to Monday through Friday.
    pub fn days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.days = Some(days.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the number of slots in a day.
    pub fn slots_per_day(mut self, value: usize) -> Self {
        self.slots_per_day = Some(value);
        self
    }

    /// Sets the start of the daily window in minutes after midnight.
    pub fn day_start_minutes(mut self, value: u32) -> Self {
        self.day_start_minutes = Some(value);
        self
    }

    /// Validates the input and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::MalformedInput` if there are no rooms, no
    /// days, no slots per day, no events, or an event whose duration is zero
    /// or longer than a day.
    pub fn build(self) -> Result<EventCatalog> {
        let events: Vec<Event> = self
            .events
            .into_iter()
            .enumerate()
            .map(|(id, (name, duration))| Event { id, name, duration })
            .collect();
        let durations: Arc<[usize]> = events.iter().map(|e| e.duration).collect();

        let catalog = EventCatalog {
            events,
            durations,
            rooms: self.rooms,
            days: self
                .days
                .unwrap_or_else(|| DEFAULT_DAYS.iter().map(|d| d.to_string()).collect()),
            slots_per_day: self.slots_per_day.unwrap_or(DEFAULT_SLOTS_PER_DAY),
            day_start_minutes: self.day_start_minutes.unwrap_or(DEFAULT_DAY_START_MINUTES),
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Serialized form of a catalog. Deserialization goes through
/// [`EventCatalogBuilder`], so a stored catalog is checked like a new one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CatalogRecord {
    events: Vec<Event>,
    rooms: Vec<String>,
    days: Vec<String>,
    slots_per_day: usize,
    day_start_minutes: u32,
}

#[cfg(feature = "serde")]
impl CatalogRecord {
    fn into_catalog(self) -> Result<EventCatalog> {
        let mut builder = EventCatalog::builder()
            .rooms(self.rooms)
            .days(self.days)
            .slots_per_day(self.slots_per_day)
            .day_start_minutes(self.day_start_minutes);
        for (index, event) in self.events.into_iter().enumerate() {
            if event.id != index {
                return Err(TimetableError::MalformedInput(format!(
                    "event `{}` has id {} at position {}",
                    event.name, event.id, index
                )));
            }
            builder = builder.event(event.name, event.duration);
        }
        builder.build()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EventCatalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = <CatalogRecord as serde::Deserialize>::deserialize(deserializer)?;
        record.into_catalog().map_err(serde::de::Error::custom)
    }
}
