use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::NaiveDate;
use model::{
    availability::AvailabilitySlot,
    class::GroupClass,
    day::Day,
    errors::StorageError,
    rooms::Room,
    session::{Filter, Session},
    window::TimeWindow,
};
use storage::BookingStore;

use super::date_span;

/// Read-only schedule listings. Served from plain snapshots, not linked to admissions.
#[derive(Clone)]
pub struct ScheduleViews {
    store: Arc<dyn BookingStore>,
}

#[derive(Debug, Clone)]
pub struct TrainerSchedule {
    pub sessions: Vec<Session>,
    pub classes: Vec<GroupClass>,
    pub availability: Vec<AvailabilitySlot>,
}

#[derive(Debug, Clone)]
pub enum Occupant {
    Session(Session),
    Class(GroupClass),
}

impl Occupant {
    pub fn window(&self) -> &TimeWindow {
        match self {
            Occupant::Session(session) => &session.window,
            Occupant::Class(class) => &class.window,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomSchedule {
    pub room: Room,
    pub occupants: Vec<Occupant>,
}

impl ScheduleViews {
    pub(crate) fn new(store: Arc<dyn BookingStore>) -> Self {
        ScheduleViews { store }
    }

    async fn days(&self, from: NaiveDate, days: u32) -> Result<Vec<Day>, StorageError> {
        match date_span(from, days) {
            Some((from, to)) => self.store.days(from, to).await,
            None => Ok(Vec::new()),
        }
    }

    /// Scheduled sessions and classes of the trainer in `days` days starting at `from`,
    /// plus the weekly availability.
    pub async fn trainer_schedule(
        &self,
        trainer_id: ObjectId,
        from: NaiveDate,
        days: u32,
    ) -> Result<TrainerSchedule, StorageError> {
        let filter = Filter::Trainer(trainer_id);
        let mut sessions = Vec::new();
        let mut classes = Vec::new();
        for day in self.days(from, days).await? {
            sessions.extend(
                day.scheduled_sessions()
                    .filter(|s| filter.is_match(s))
                    .cloned(),
            );
            classes.extend(
                day.scheduled_classes()
                    .filter(|c| c.trainer_id == trainer_id)
                    .cloned(),
            );
        }
        sessions.sort_by_key(|s| s.window.start_at());
        classes.sort_by_key(|c| c.window.start_at());

        let availability = self.store.load_calendar(trainer_id).await?.sorted();
        Ok(TrainerSchedule {
            sessions,
            classes,
            availability,
        })
    }

    pub async fn member_sessions(
        &self,
        member_id: ObjectId,
        from: NaiveDate,
        days: u32,
    ) -> Result<Vec<Session>, StorageError> {
        let filter = Filter::Member(member_id);
        let mut sessions = self
            .days(from, days)
            .await?
            .into_iter()
            .flat_map(|day| day.sessions)
            .filter(|s| s.is_scheduled() && filter.is_match(s))
            .collect::<Vec<_>>();
        sessions.sort_by_key(|s| s.window.start_at());
        Ok(sessions)
    }

    /// Every room with its scheduled occupants on the date; rooms by name, occupants by start.
    pub async fn room_schedule(&self, date: NaiveDate) -> Result<Vec<RoomSchedule>, StorageError> {
        let day = self.store.load_day(date).await?;
        let mut rooms = self.store.list_rooms(None).await?;
        rooms.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(rooms
            .into_iter()
            .map(|room| {
                let mut occupants = day
                    .scheduled_sessions()
                    .filter(|s| s.room_id == room.id)
                    .cloned()
                    .map(Occupant::Session)
                    .chain(
                        day.scheduled_classes()
                            .filter(|c| c.room_id == room.id)
                            .cloned()
                            .map(Occupant::Class),
                    )
                    .collect::<Vec<_>>();
                occupants.sort_by_key(|o| o.window().start);
                RoomSchedule { room, occupants }
            })
            .collect())
    }
}
