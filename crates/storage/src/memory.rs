use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use model::{
    availability::TrainerCalendar,
    day::Day,
    errors::StorageError,
    rooms::{Room, RoomType},
};
use mongodb::bson::oid::ObjectId;
use parking_lot::Mutex;

use crate::BookingStore;

/// Process-local store with the same compare-and-swap semantics as the
/// MongoDB one.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    days: BTreeMap<NaiveDate, Day>,
    calendars: HashMap<ObjectId, TrainerCalendar>,
    rooms: BTreeMap<ObjectId, Room>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn load_day(&self, date: NaiveDate) -> Result<Day, StorageError> {
        let state = self.state.lock();
        Ok(state
            .days
            .get(&date)
            .cloned()
            .unwrap_or_else(|| Day::new(date)))
    }

    async fn store_day(&self, day: &mut Day) -> Result<bool, StorageError> {
        let mut state = self.state.lock();
        let stored = state.days.get(&day.date).map(|d| d.version).unwrap_or(0);
        if stored != day.version {
            return Ok(false);
        }
        day.version += 1;
        state.days.insert(day.date, day.clone());
        Ok(true)
    }

    async fn days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Day>, StorageError> {
        if from > to {
            return Ok(Vec::new());
        }
        let state = self.state.lock();
        Ok(state.days.range(from..=to).map(|(_, day)| day.clone()).collect())
    }

    async fn day_with_session(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .days
            .values()
            .find(|day| day.sessions.iter().any(|s| s.id == id))
            .cloned())
    }

    async fn day_with_class(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .days
            .values()
            .find(|day| day.classes.iter().any(|c| c.id == id))
            .cloned())
    }

    async fn load_calendar(&self, trainer_id: ObjectId) -> Result<TrainerCalendar, StorageError> {
        let state = self.state.lock();
        Ok(state
            .calendars
            .get(&trainer_id)
            .cloned()
            .unwrap_or_else(|| TrainerCalendar::new(trainer_id)))
    }

    async fn store_calendar(&self, calendar: &mut TrainerCalendar) -> Result<bool, StorageError> {
        let mut state = self.state.lock();
        let stored = state
            .calendars
            .get(&calendar.trainer_id)
            .map(|c| c.version)
            .unwrap_or(0);
        if stored != calendar.version {
            return Ok(false);
        }
        calendar.version += 1;
        state.calendars.insert(calendar.trainer_id, calendar.clone());
        Ok(true)
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if state.rooms.contains_key(&room.id) {
            return Err(StorageError::msg(format!("Room {} already exists", room.id)));
        }
        state.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn get_room(&self, id: ObjectId) -> Result<Option<Room>, StorageError> {
        Ok(self.state.lock().rooms.get(&id).cloned())
    }

    async fn list_rooms(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .rooms
            .values()
            .filter(|room| tp.map(|tp| room.tp == tp).unwrap_or(true))
            .cloned()
            .collect())
    }
}
