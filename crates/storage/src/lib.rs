pub mod availability;
pub mod calendar;
pub mod memory;
pub mod rooms;
pub mod session;

use async_trait::async_trait;
use availability::AvailabilityStore;
use calendar::CalendarStore;
use chrono::{NaiveDate, Weekday};
use eyre::Result;
use log::{debug, info};
use model::{
    availability::{AvailabilitySlot, TrainerCalendar},
    day::{Collision, Day},
    errors::StorageError,
    rooms::{Room, RoomType},
    session::{BookingStatus, Filter, NewSession, Session},
    window::TimeRange,
};
use mongodb::bson::oid::ObjectId;
use rooms::RoomStore;
use session::Db;
use thiserror::Error;

pub use memory::MemoryStore;

/// How many times a read-check-write cycle is retried when a concurrent
/// writer wins the compare-and-swap.
pub const MAX_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Trainer is busy at this time: {0:?}")]
    TrainerConflict(Collision),
    #[error("Room is occupied: {0:?}")]
    RoomConflict(Collision),
    #[error("Availability overlaps slot {:?}", .0.range())]
    AvailabilityOverlap(AvailabilitySlot),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Persistence collaborator of the scheduler.
///
/// Implementations provide versioned documents: a [`Day`] per calendar date and
/// a [`TrainerCalendar`] per trainer. `store_*` writes only if the stored version
/// still equals the version that was read, and bumps it on success. Everything
/// that must be checked and written atomically goes through [`update_day`] or
/// [`update_calendar`].
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Snapshot of the date. A date without occupants yields an empty day with version 0.
    async fn load_day(&self, date: NaiveDate) -> Result<Day, StorageError>;
    async fn store_day(&self, day: &mut Day) -> Result<bool, StorageError>;
    /// Persisted days in `from..=to`, ordered by date.
    async fn days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Day>, StorageError>;
    async fn day_with_session(&self, id: ObjectId) -> Result<Option<Day>, StorageError>;
    async fn day_with_class(&self, id: ObjectId) -> Result<Option<Day>, StorageError>;

    async fn load_calendar(&self, trainer_id: ObjectId) -> Result<TrainerCalendar, StorageError>;
    async fn store_calendar(&self, calendar: &mut TrainerCalendar) -> Result<bool, StorageError>;

    async fn insert_room(&self, room: &Room) -> Result<(), StorageError>;
    async fn get_room(&self, id: ObjectId) -> Result<Option<Room>, StorageError>;
    /// Rooms ordered by id.
    async fn list_rooms(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError>;

    async fn list_availability(
        &self,
        trainer_id: ObjectId,
        weekday: Weekday,
    ) -> Result<Vec<AvailabilitySlot>, StorageError> {
        let calendar = self.load_calendar(trainer_id).await?;
        Ok(calendar.day(weekday).copied().collect())
    }

    async fn list_sessions(
        &self,
        filter: Filter,
        date: NaiveDate,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Session>, StorageError> {
        let day = self.load_day(date).await?;
        Ok(day
            .sessions
            .into_iter()
            .filter(|s| filter.is_match(s))
            .filter(|s| status.map(|status| s.status == status).unwrap_or(true))
            .collect())
    }

    /// Inserts a scheduled session unless the trainer (by a session or a class they lead)
    /// or the room is already taken for an overlapping window on that date.
    async fn create_session(&self, new: NewSession) -> Result<Session, CommitError> {
        let session = update_day(self, new.window.date, |day| {
            if let Some(collision) = day.trainer_collision(new.trainer_id, &new.window) {
                return Err(CommitError::TrainerConflict(collision));
            }
            if let Some(collision) = day.room_collision(new.room_id, &new.window) {
                return Err(CommitError::RoomConflict(collision));
            }
            let session = Session::new(new);
            day.sessions.push(session.clone());
            Ok(session)
        })
        .await?;
        info!("Session created: {:?}", session);
        Ok(session)
    }

    /// Inserts a weekly slot unless it overlaps another slot of the trainer on that weekday.
    async fn create_availability(
        &self,
        trainer_id: ObjectId,
        weekday: Weekday,
        range: TimeRange,
    ) -> Result<AvailabilitySlot, CommitError> {
        let slot = update_calendar(self, trainer_id, |calendar| {
            if let Some(existing) = calendar.check_overlap(weekday, &range) {
                return Err(CommitError::AvailabilityOverlap(*existing));
            }
            let slot = AvailabilitySlot::new(trainer_id, weekday, range);
            calendar.slots.push(slot);
            Ok(slot)
        })
        .await?;
        info!("Availability created: {:?}", slot);
        Ok(slot)
    }
}

/// Read-check-write on one day. `apply` runs against a fresh snapshot on every
/// attempt, so a lost race re-observes whatever the winner wrote.
pub async fn update_day<S, T, E, F>(store: &S, date: NaiveDate, mut apply: F) -> Result<T, E>
where
    S: BookingStore + ?Sized,
    F: FnMut(&mut Day) -> Result<T, E> + Send,
    E: From<StorageError> + Send,
    T: Send,
{
    for attempt in 0..MAX_ATTEMPTS {
        let mut day = store.load_day(date).await?;
        let result = apply(&mut day)?;
        if store.store_day(&mut day).await? {
            return Ok(result);
        }
        debug!("Day {} changed concurrently, attempt {}", date, attempt + 1);
    }
    Err(StorageError::msg(format!("Too many concurrent updates of day {}", date)).into())
}

pub async fn update_calendar<S, T, E, F>(store: &S, trainer_id: ObjectId, mut apply: F) -> Result<T, E>
where
    S: BookingStore + ?Sized,
    F: FnMut(&mut TrainerCalendar) -> Result<T, E> + Send,
    E: From<StorageError> + Send,
    T: Send,
{
    for attempt in 0..MAX_ATTEMPTS {
        let mut calendar = store.load_calendar(trainer_id).await?;
        let result = apply(&mut calendar)?;
        if store.store_calendar(&mut calendar).await? {
            return Ok(result);
        }
        debug!(
            "Calendar of {} changed concurrently, attempt {}",
            trainer_id,
            attempt + 1
        );
    }
    Err(StorageError::msg(format!(
        "Too many concurrent updates of calendar {}",
        trainer_id
    ))
    .into())
}

/// MongoDB backed store.
#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub calendar: CalendarStore,
    pub availability: AvailabilityStore,
    pub rooms: RoomStore,
}

impl Storage {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let db = Db::new(uri, db_name).await?;
        let calendar = CalendarStore::new(&db).await?;
        let availability = AvailabilityStore::new(&db);
        let rooms = RoomStore::new(&db).await?;

        Ok(Storage {
            db,
            calendar,
            availability,
            rooms,
        })
    }
}

#[async_trait]
impl BookingStore for Storage {
    async fn load_day(&self, date: NaiveDate) -> Result<Day, StorageError> {
        self.calendar.get_day(date).await
    }

    async fn store_day(&self, day: &mut Day) -> Result<bool, StorageError> {
        self.calendar.put_day(day).await
    }

    async fn days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Day>, StorageError> {
        self.calendar.find_range(from, to).await
    }

    async fn day_with_session(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        self.calendar.find_by_session(id).await
    }

    async fn day_with_class(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        self.calendar.find_by_class(id).await
    }

    async fn load_calendar(&self, trainer_id: ObjectId) -> Result<TrainerCalendar, StorageError> {
        self.availability.get(trainer_id).await
    }

    async fn store_calendar(&self, calendar: &mut TrainerCalendar) -> Result<bool, StorageError> {
        self.availability.put(calendar).await
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StorageError> {
        self.rooms.insert(room).await
    }

    async fn get_room(&self, id: ObjectId) -> Result<Option<Room>, StorageError> {
        self.rooms.get(id).await
    }

    async fn list_rooms(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError> {
        self.rooms.find(tp).await
    }
}
