//! Index arithmetic for the flat week grid.
//!
//! The grid is a single run of slots ordered day by day, and within a day
//! room by room. Each `(day, room)` pair owns one contiguous block of
//! `slots_per_day` slots:
//!
//! ```text
//! block = day * rooms + room
//! slot  = block * slots_per_day + offset
//! ```

use std::ops::Range;

use crate::catalog::EventCatalog;

/// Position of a slot within the week.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPosition {
    pub day: usize,
    pub room: usize,
    /// Slot offset from the start of the day.
    pub offset: usize,
}

/// Dimensions of the week grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekLayout {
    days: usize,
    rooms: usize,
    slots_per_day: usize,
}

impl WeekLayout {
    pub fn new(days: usize, rooms: usize, slots_per_day: usize) -> Self {
        Self {
            days,
            rooms,
            slots_per_day,
        }
    }

    pub fn from_catalog(catalog: &EventCatalog) -> Self {
        Self::new(
            catalog.day_count(),
            catalog.room_count(),
            catalog.slots_per_day(),
        )
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn rooms(&self) -> usize {
        self.rooms
    }

    pub fn slots_per_day(&self) -> usize {
        self.slots_per_day
    }

    /// Number of `(day, room)` blocks.
    pub fn block_count(&self) -> usize {
        self.days * self.rooms
    }

    /// Length of the flat grid.
    pub fn total_slots(&self) -> usize {
        self.block_count() * self.slots_per_day
    }

    pub fn block_index(&self, day: usize, room: usize) -> usize {
        day * self.rooms + room
    }

    pub fn block_start(&self, block: usize) -> usize {
        block * self.slots_per_day
    }

    /// Half-open slot range covered by a block.
    pub fn block_range(&self, block: usize) -> Range<usize> {
        let start = self.block_start(block);
        start..start + self.slots_per_day
    }

    pub fn block_of(&self, slot: usize) -> usize {
        slot / self.slots_per_day
    }

    pub fn offset_of(&self, slot: usize) -> usize {
        slot % self.slots_per_day
    }

    pub fn slot_index(&self, day: usize, room: usize, offset: usize) -> usize {
        self.block_start(self.block_index(day, room)) + offset
    }

    pub fn locate(&self, slot: usize) -> SlotPosition {
        let block = self.block_of(slot);
        SlotPosition {
            day: block / self.rooms,
            room: block % self.rooms,
            offset: self.offset_of(slot),
        }
    }

    /// Number of distinct start offsets for an event of `duration` slots.
    pub fn start_offsets(&self, duration: usize) -> usize {
        (self.slots_per_day + 1).saturating_sub(duration)
    }

    /// Whether `[start, start + duration)` lies inside the grid without
    /// crossing a block boundary.
    pub fn fits(&self, start: usize, duration: usize) -> bool {
        duration > 0
            && start < self.total_slots()
            && self.offset_of(start) + duration <= self.slots_per_day
    }
}
