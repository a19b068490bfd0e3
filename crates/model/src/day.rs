use bson::oid::ObjectId;
use chrono::{Datelike as _, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{class::GroupClass, session::Session, window::TimeWindow};

/// All room occupants of one calendar date.
/// Every write to a day bumps `version`; stores only accept a write whose
/// `version` matches the stored one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Day {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub date: NaiveDate,
    pub weekday: Weekday,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub classes: Vec<GroupClass>,
    #[serde(default)]
    pub version: u64,
}

impl Day {
    pub fn new(date: NaiveDate) -> Day {
        Day {
            id: ObjectId::new(),
            date,
            weekday: date.weekday(),
            sessions: Vec::new(),
            classes: Vec::new(),
            version: 0,
        }
    }

    pub fn scheduled_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_scheduled())
    }

    pub fn scheduled_classes(&self) -> impl Iterator<Item = &GroupClass> {
        self.classes.iter().filter(|c| c.is_scheduled())
    }

    /// Scheduled session of the trainer overlapping the window.
    pub fn session_collision(&self, trainer_id: ObjectId, window: &TimeWindow) -> Option<Collision> {
        self.scheduled_sessions()
            .find(|s| s.trainer_id == trainer_id && s.window.overlaps(window))
            .map(|s| Collision::Session(s.id))
    }

    /// Scheduled session or class of the trainer overlapping the window.
    pub fn trainer_collision(&self, trainer_id: ObjectId, window: &TimeWindow) -> Option<Collision> {
        self.session_collision(trainer_id, window).or_else(|| {
            self.scheduled_classes()
                .find(|c| c.trainer_id == trainer_id && c.window.overlaps(window))
                .map(|c| Collision::Class(c.id))
        })
    }

    /// Scheduled session or class occupying the room during the window.
    pub fn room_collision(&self, room_id: ObjectId, window: &TimeWindow) -> Option<Collision> {
        let session = self
            .scheduled_sessions()
            .find(|s| s.room_id == room_id && s.window.overlaps(window))
            .map(|s| Collision::Session(s.id));
        session.or_else(|| {
            self.scheduled_classes()
                .find(|c| c.room_id == room_id && c.window.overlaps(window))
                .map(|c| Collision::Class(c.id))
        })
    }

    pub fn session_mut(&mut self, id: ObjectId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn class_mut(&mut self, id: ObjectId) -> Option<&mut GroupClass> {
        self.classes.iter_mut().find(|c| c.id == id)
    }

    /// True if two scheduled occupants share a trainer or a room in overlapping windows.
    pub fn has_conflict(&self) -> bool {
        let occupants = self
            .scheduled_sessions()
            .map(|s| (s.trainer_id, s.room_id, s.window))
            .chain(self.scheduled_classes().map(|c| (c.trainer_id, c.room_id, c.window)))
            .collect::<Vec<_>>();

        for (idx, (trainer, room, window)) in occupants.iter().enumerate() {
            for (other_trainer, other_room, other_window) in &occupants[idx + 1..] {
                if (trainer == other_trainer || room == other_room) && window.overlaps(other_window)
                {
                    return true;
                }
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Session(ObjectId),
    Class(ObjectId),
}
