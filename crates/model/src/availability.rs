use bson::oid::ObjectId;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::window::{TimeRange, TimeWindow};

/// Recurring weekly window in which a trainer accepts bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub trainer_id: ObjectId,
    pub weekday: Weekday,
    pub start: chrono::NaiveTime,
    pub end: chrono::NaiveTime,
}

impl AvailabilitySlot {
    pub fn new(trainer_id: ObjectId, weekday: Weekday, range: TimeRange) -> AvailabilitySlot {
        AvailabilitySlot {
            id: ObjectId::new(),
            trainer_id,
            weekday,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }

    pub fn covers(&self, window: &TimeWindow) -> bool {
        self.weekday == window.weekday() && self.range().contains(&window.range())
    }
}

/// All weekly slots of one trainer. Stored as a single versioned document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerCalendar {
    #[serde(rename = "_id")]
    pub trainer_id: ObjectId,
    pub slots: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub version: u64,
}

impl TrainerCalendar {
    pub fn new(trainer_id: ObjectId) -> TrainerCalendar {
        TrainerCalendar {
            trainer_id,
            slots: Vec::new(),
            version: 0,
        }
    }

    pub fn day(&self, weekday: Weekday) -> impl Iterator<Item = &AvailabilitySlot> {
        self.slots.iter().filter(move |slot| slot.weekday == weekday)
    }

    pub fn check_overlap(&self, weekday: Weekday, range: &TimeRange) -> Option<&AvailabilitySlot> {
        self.day(weekday).find(|slot| slot.range().overlaps(range))
    }

    /// Slots ordered Monday..Sunday, then by start time.
    pub fn sorted(&self) -> Vec<AvailabilitySlot> {
        let mut slots = self.slots.clone();
        slots.sort_by_key(|slot| (slot.weekday.num_days_from_monday(), slot.start));
        slots
    }
}
