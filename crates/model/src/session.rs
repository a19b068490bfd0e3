use bson::oid::ObjectId;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum BookingStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, BookingStatus::Scheduled)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_scheduled()
    }

    pub fn can_become(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Scheduled, BookingStatus::Cancelled)
                | (BookingStatus::Scheduled, BookingStatus::Completed)
        )
    }
}

/// Personal training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub member_id: ObjectId,
    pub trainer_id: ObjectId,
    pub room_id: ObjectId,
    pub window: TimeWindow,
    pub status: BookingStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: chrono::DateTime<Utc>,
}

impl Session {
    pub fn new(new: NewSession) -> Session {
        Session {
            id: ObjectId::new(),
            member_id: new.member_id,
            trainer_id: new.trainer_id,
            room_id: new.room_id,
            window: new.window,
            status: BookingStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status.is_scheduled()
    }

    pub fn is_finished(&self, now: NaiveDateTime) -> bool {
        self.window.end_at() <= now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSession {
    pub member_id: ObjectId,
    pub trainer_id: ObjectId,
    pub room_id: ObjectId,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Member(ObjectId),
    Trainer(ObjectId),
    Room(ObjectId),
}

impl Filter {
    pub fn is_match(&self, session: &Session) -> bool {
        match self {
            Filter::Member(id) => session.member_id == *id,
            Filter::Trainer(id) => session.trainer_id == *id,
            Filter::Room(id) => session.room_id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;
        assert!(Scheduled.can_become(Cancelled));
        assert!(Scheduled.can_become(Completed));
        assert!(!Scheduled.can_become(Scheduled));
        assert!(!Cancelled.can_become(Completed));
        assert!(!Cancelled.can_become(Scheduled));
        assert!(!Completed.can_become(Cancelled));
        assert!(Cancelled.is_terminal());
        assert!(Completed.is_terminal());
    }
}
