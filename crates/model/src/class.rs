use bson::oid::ObjectId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{session::BookingStatus, window::TimeWindow};

/// Group class occupying a room for a window, with fixed enrollment capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupClass {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub trainer_id: ObjectId,
    pub room_id: ObjectId,
    pub window: TimeWindow,
    pub capacity: u32,
    pub members: Vec<ObjectId>,
    pub status: BookingStatus,
}

impl GroupClass {
    pub fn new(
        name: String,
        trainer_id: ObjectId,
        room_id: ObjectId,
        window: TimeWindow,
        capacity: u32,
    ) -> GroupClass {
        GroupClass {
            id: ObjectId::new(),
            name,
            trainer_id,
            room_id,
            window,
            capacity,
            members: Vec::new(),
            status: BookingStatus::Scheduled,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status.is_scheduled()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() as u32 >= self.capacity
    }

    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.members.len() as u32)
    }

    pub fn is_finished(&self, now: NaiveDateTime) -> bool {
        self.window.end_at() <= now
    }
}
