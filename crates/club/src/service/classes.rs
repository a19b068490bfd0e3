use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{Local, NaiveDate};
use log::info;
use model::{
    class::GroupClass,
    errors::StorageError,
    rooms::RoomType,
    session::BookingStatus,
    window::{TimeWindow, WindowError},
};
use storage::{update_day, BookingStore};
use thiserror::Error;
use tokio::sync::Mutex;

use super::{admit_window, date_span, today};
use crate::SchedulerConfig;

/// Group classes: room contention with personal sessions plus enrollment.
#[derive(Clone)]
pub struct Classes {
    store: Arc<dyn BookingStore>,
    config: SchedulerConfig,
    admission: Arc<Mutex<()>>,
}

impl Classes {
    pub(crate) fn new(
        store: Arc<dyn BookingStore>,
        config: SchedulerConfig,
        admission: Arc<Mutex<()>>,
    ) -> Self {
        Classes {
            store,
            config,
            admission,
        }
    }

    pub async fn schedule_class(
        &self,
        name: String,
        trainer_id: ObjectId,
        room_id: ObjectId,
        window: TimeWindow,
        capacity: u32,
    ) -> Result<GroupClass, ClassError> {
        let window = admit_window(&window, &self.config)?;
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(ClassError::RoomNotFound(room_id))?;
        if room.tp != RoomType::GroupClass {
            return Err(ClassError::WrongRoomType(room.tp));
        }
        if capacity == 0 || capacity > room.capacity {
            return Err(ClassError::InvalidCapacity {
                requested: capacity,
                room: room.capacity,
            });
        }

        let _admission = self.admission.lock().await;
        let class = update_day(self.store.as_ref(), window.date, |day| {
            if day.trainer_collision(trainer_id, &window).is_some() {
                return Err(ClassError::TrainerConflict);
            }
            if day.room_collision(room_id, &window).is_some() {
                return Err(ClassError::RoomOccupied);
            }
            let class = GroupClass::new(name.clone(), trainer_id, room_id, window, capacity);
            day.classes.push(class.clone());
            Ok(class)
        })
        .await?;
        info!(
            "Class {} scheduled in {} at {:?} with trainer {}",
            class.name, room.name, window, trainer_id
        );
        Ok(class)
    }

    /// Upcoming scheduled classes with spots left in `days` days starting at `from`,
    /// ordered by date and start time.
    pub async fn open_classes(
        &self,
        from: NaiveDate,
        days: u32,
    ) -> Result<Vec<GroupClass>, StorageError> {
        let Some((from, to)) = date_span(from, days) else {
            return Ok(Vec::new());
        };
        let now = Local::now().naive_local();
        let allow_past = self.config.allow_past_dates;

        let mut classes = self
            .store
            .days(from, to)
            .await?
            .into_iter()
            .flat_map(|day| day.classes)
            .filter(|c| c.is_scheduled() && !c.is_full())
            .filter(|c| allow_past || c.window.start_at() > now)
            .collect::<Vec<_>>();
        classes.sort_by_key(|c| c.window.start_at());
        Ok(classes)
    }

    pub async fn get_class(&self, id: ObjectId) -> Result<Option<GroupClass>, StorageError> {
        let day = self.store.day_with_class(id).await?;
        Ok(day.and_then(|day| day.classes.into_iter().find(|c| c.id == id)))
    }

    pub async fn register_for_class(
        &self,
        class_id: ObjectId,
        member_id: ObjectId,
    ) -> Result<GroupClass, ClassError> {
        let day = self
            .store
            .day_with_class(class_id)
            .await?
            .ok_or(ClassError::ClassNotFound(class_id))?;
        let allow_past = self.config.allow_past_dates;
        let today = today();

        let class = update_day(self.store.as_ref(), day.date, |day| {
            let class = day
                .class_mut(class_id)
                .ok_or(ClassError::ClassNotFound(class_id))?;
            if !class.is_scheduled() {
                return Err(ClassError::ClassNotOpen(class.status));
            }
            if !allow_past && class.window.is_past(today) {
                return Err(ClassError::ClassInPast(class.window.date));
            }
            if class.members.contains(&member_id) {
                return Err(ClassError::AlreadyRegistered);
            }
            if class.is_full() {
                return Err(ClassError::ClassFull);
            }
            class.members.push(member_id);
            Ok(class.clone())
        })
        .await?;
        info!(
            "Member {} registered for {}, {} spots left",
            member_id,
            class.name,
            class.spots_left()
        );
        Ok(class)
    }

    pub async fn cancel_class(&self, class_id: ObjectId) -> Result<GroupClass, ClassError> {
        let day = self
            .store
            .day_with_class(class_id)
            .await?
            .ok_or(ClassError::ClassNotFound(class_id))?;

        let class = update_day(self.store.as_ref(), day.date, |day| {
            let class = day
                .class_mut(class_id)
                .ok_or(ClassError::ClassNotFound(class_id))?;
            if !class.status.can_become(BookingStatus::Cancelled) {
                return Err(ClassError::InvalidTransition {
                    from: class.status,
                    to: BookingStatus::Cancelled,
                });
            }
            class.status = BookingStatus::Cancelled;
            Ok(class.clone())
        })
        .await?;
        info!("Class {} cancelled", class.id);
        Ok(class)
    }
}

#[derive(Debug, Error)]
pub enum ClassError {
    #[error("Invalid window: {0}")]
    InvalidWindow(#[from] WindowError),
    #[error("Room not found: {0}")]
    RoomNotFound(ObjectId),
    #[error("Room type {0} can't host group classes")]
    WrongRoomType(RoomType),
    #[error("Capacity {requested} doesn't fit the room ({room})")]
    InvalidCapacity { requested: u32, room: u32 },
    #[error("Trainer is busy at this time")]
    TrainerConflict,
    #[error("Room is occupied at this time")]
    RoomOccupied,
    #[error("Class not found: {0}")]
    ClassNotFound(ObjectId),
    #[error("Class is not open for registration ({0})")]
    ClassNotOpen(BookingStatus),
    #[error("Class took place on {0}, registration is closed")]
    ClassInPast(NaiveDate),
    #[error("Class is full")]
    ClassFull,
    #[error("Already registered for this class")]
    AlreadyRegistered,
    #[error("Class is {from}, can't become {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
