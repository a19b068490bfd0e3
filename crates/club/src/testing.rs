use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Datelike as _, Duration, NaiveDate, NaiveTime, Weekday};
use model::{
    availability::TrainerCalendar,
    day::Day,
    errors::StorageError,
    rooms::{Room, RoomType},
    session::{NewSession, Session},
    window::{TimeRange, TimeWindow},
};
use storage::{BookingStore, CommitError, MemoryStore};

use crate::{service::today, Club, SchedulerConfig};

/// A Monday at least a week ahead.
pub fn next_monday() -> NaiveDate {
    let today = today();
    let days = 7 - today.weekday().num_days_from_monday() as i64;
    today + Duration::days(days + 7)
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn range(from: (u32, u32), to: (u32, u32)) -> TimeRange {
    TimeRange::new(time(from.0, from.1), time(to.0, to.1)).unwrap()
}

pub fn window(date: NaiveDate, from: (u32, u32), to: (u32, u32)) -> TimeWindow {
    TimeWindow::with_range(date, range(from, to))
}

pub fn id(n: u8) -> ObjectId {
    ObjectId::from_bytes([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, n])
}

pub fn club() -> (Club, Arc<MemoryStore>) {
    club_with(SchedulerConfig::default())
}

pub fn club_with(config: SchedulerConfig) -> (Club, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Club::new(store.clone(), config), store)
}

pub async fn add_room(store: &MemoryStore, n: u8, tp: RoomType, capacity: u32) -> Room {
    let room = Room {
        id: id(n),
        name: format!("Room {}", n),
        tp,
        capacity,
    };
    store.insert_room(&room).await.unwrap();
    room
}

/// Trainer available on Mondays within `from..to`.
pub async fn monday_trainer(club: &Club, from: (u32, u32), to: (u32, u32)) -> ObjectId {
    let trainer = ObjectId::new();
    club.availability
        .add_availability(trainer, Weekday::Mon, range(from, to))
        .await
        .unwrap();
    trainer
}

/// Who takes the slot between admission and commit.
#[derive(Clone, Copy)]
pub enum Rival {
    /// Another trainer books the chosen room.
    Room,
    /// The same trainer is booked elsewhere by another process.
    Trainer,
}

/// Store that lets a competing writer commit right before each of the first
/// `races` session inserts, as another process would.
pub struct RacingStore {
    pub inner: MemoryStore,
    rival: Rival,
    races: AtomicUsize,
}

impl RacingStore {
    pub fn new(rival: Rival, races: usize) -> RacingStore {
        RacingStore {
            inner: MemoryStore::new(),
            rival,
            races: AtomicUsize::new(races),
        }
    }

    pub fn races_left(&self) -> usize {
        self.races.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookingStore for RacingStore {
    async fn load_day(&self, date: NaiveDate) -> Result<Day, StorageError> {
        self.inner.load_day(date).await
    }

    async fn store_day(&self, day: &mut Day) -> Result<bool, StorageError> {
        self.inner.store_day(day).await
    }

    async fn days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Day>, StorageError> {
        self.inner.days(from, to).await
    }

    async fn day_with_session(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        self.inner.day_with_session(id).await
    }

    async fn day_with_class(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        self.inner.day_with_class(id).await
    }

    async fn load_calendar(&self, trainer_id: ObjectId) -> Result<TrainerCalendar, StorageError> {
        self.inner.load_calendar(trainer_id).await
    }

    async fn store_calendar(&self, calendar: &mut TrainerCalendar) -> Result<bool, StorageError> {
        self.inner.store_calendar(calendar).await
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StorageError> {
        self.inner.insert_room(room).await
    }

    async fn get_room(&self, id: ObjectId) -> Result<Option<Room>, StorageError> {
        self.inner.get_room(id).await
    }

    async fn list_rooms(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError> {
        self.inner.list_rooms(tp).await
    }

    async fn create_session(&self, new: NewSession) -> Result<Session, CommitError> {
        let race = self
            .races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if race {
            let rival = match self.rival {
                Rival::Room => NewSession {
                    member_id: ObjectId::new(),
                    trainer_id: ObjectId::new(),
                    ..new
                },
                Rival::Trainer => NewSession {
                    member_id: ObjectId::new(),
                    room_id: ObjectId::new(),
                    ..new
                },
            };
            self.inner.create_session(rival).await?;
        }
        self.inner.create_session(new).await
    }
}

pub fn racing_club(rival: Rival, races: usize) -> (Club, Arc<RacingStore>) {
    let store = Arc::new(RacingStore::new(rival, races));
    (Club::new(store.clone(), SchedulerConfig::default()), store)
}
