use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, error, info};
use model::{
    day::Day,
    errors::StorageError,
    rooms::{Room, RoomType},
    session::{BookingStatus, Filter, NewSession, Session},
    window::{TimeWindow, WindowError},
};
use storage::{update_day, BookingStore, CommitError};
use thiserror::Error;
use tokio::sync::Mutex;

use super::admit_window;
use crate::SchedulerConfig;

/// How many times admission is re-evaluated after the chosen room was taken
/// by a concurrent writer.
const ROOM_ATTEMPTS: usize = 4;

/// Admits personal training sessions.
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<dyn BookingStore>,
    config: SchedulerConfig,
    admission: Arc<Mutex<()>>,
}

impl Scheduler {
    pub(crate) fn new(
        store: Arc<dyn BookingStore>,
        config: SchedulerConfig,
        admission: Arc<Mutex<()>>,
    ) -> Self {
        Scheduler {
            store,
            config,
            admission,
        }
    }

    /// Books a personal training session.
    ///
    /// Checks run in order and the first failing one decides the error:
    /// the window must lie inside one of the trainer's availability slots for
    /// that weekday, the trainer must have no overlapping scheduled session or class,
    /// and some personal training room must be free (lowest id wins).
    /// Nothing is written unless every check passes.
    pub async fn request_booking(
        &self,
        member_id: ObjectId,
        trainer_id: ObjectId,
        window: TimeWindow,
    ) -> Result<Session, BookingError> {
        let window = admit_window(&window, &self.config)?;
        let _admission = self.admission.lock().await;

        let slots = self
            .store
            .list_availability(trainer_id, window.weekday())
            .await?;
        if !slots.iter().any(|slot| slot.covers(&window)) {
            debug!("Trainer {} is not available at {:?}", trainer_id, window);
            return Err(BookingError::TrainerUnavailable);
        }

        for _ in 0..ROOM_ATTEMPTS {
            let sessions = self
                .store
                .list_sessions(
                    Filter::Trainer(trainer_id),
                    window.date,
                    Some(BookingStatus::Scheduled),
                )
                .await?;
            if sessions.iter().any(|s| s.window.overlaps(&window)) {
                debug!("Trainer {} is busy at {:?}", trainer_id, window);
                return Err(BookingError::TrainerConflict);
            }

            let day = self.store.load_day(window.date).await?;
            if let Some(class) = day
                .scheduled_classes()
                .find(|c| c.trainer_id == trainer_id && c.window.overlaps(&window))
            {
                debug!("Trainer {} leads class {} at {:?}", trainer_id, class.id, window);
                return Err(BookingError::TrainerConflict);
            }

            let room = self
                .find_free_room(&day, &window)
                .await?
                .ok_or(BookingError::NoRoomAvailable)?;

            let new = NewSession {
                member_id,
                trainer_id,
                room_id: room.id,
                window,
            };
            match self.store.create_session(new).await {
                Ok(session) => {
                    info!(
                        "Booked session {} for member {} with trainer {} in {} at {:?}",
                        session.id, member_id, trainer_id, room.name, window
                    );
                    return Ok(session);
                }
                Err(CommitError::RoomConflict(collision)) => {
                    debug!("Room {} was taken concurrently: {:?}", room.id, collision);
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(BookingError::NoRoomAvailable)
    }

    async fn find_free_room(
        &self,
        day: &Day,
        window: &TimeWindow,
    ) -> Result<Option<Room>, StorageError> {
        let rooms = self
            .store
            .list_rooms(Some(RoomType::PersonalTraining))
            .await?;
        Ok(rooms
            .into_iter()
            .filter(|room| day.room_collision(room.id, window).is_none())
            .min_by_key(|room| room.id))
    }

    pub async fn get_session(&self, id: ObjectId) -> Result<Option<Session>, StorageError> {
        let day = self.store.day_with_session(id).await?;
        Ok(day.and_then(|day| day.sessions.into_iter().find(|s| s.id == id)))
    }

    pub async fn cancel_session(&self, id: ObjectId) -> Result<Session, SessionError> {
        self.set_status(id, BookingStatus::Cancelled).await
    }

    pub async fn complete_session(&self, id: ObjectId) -> Result<Session, SessionError> {
        self.set_status(id, BookingStatus::Completed).await
    }

    async fn set_status(&self, id: ObjectId, status: BookingStatus) -> Result<Session, SessionError> {
        let day = self
            .store
            .day_with_session(id)
            .await?
            .ok_or(SessionError::NotFound(id))?;

        let session = update_day(self.store.as_ref(), day.date, |day| {
            let session = day.session_mut(id).ok_or(SessionError::NotFound(id))?;
            if !session.status.can_become(status) {
                return Err(SessionError::InvalidTransition {
                    from: session.status,
                    to: status,
                });
            }
            session.status = status;
            Ok(session.clone())
        })
        .await?;
        info!("Session {} is {}", id, status);
        Ok(session)
    }

    /// Marks every scheduled session and class that ended at or before `now` as completed.
    /// Returns the number of occupants that changed.
    pub async fn complete_finished(&self, now: NaiveDateTime) -> Result<usize, StorageError> {
        let to = now.date();
        let from = Duration::try_days(self.config.completion_lookback_days as i64)
            .and_then(|span| to.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        let days = self.store.days(from, to).await?;

        let mut completed = 0;
        for day in days {
            let pending = day.scheduled_sessions().any(|s| s.is_finished(now))
                || day.scheduled_classes().any(|c| c.is_finished(now));
            if !pending {
                continue;
            }

            let result = update_day(self.store.as_ref(), day.date, |day| {
                let mut count = 0;
                for session in day
                    .sessions
                    .iter_mut()
                    .filter(|s| s.is_scheduled() && s.is_finished(now))
                {
                    session.status = BookingStatus::Completed;
                    count += 1;
                }
                for class in day
                    .classes
                    .iter_mut()
                    .filter(|c| c.is_scheduled() && c.is_finished(now))
                {
                    class.status = BookingStatus::Completed;
                    count += 1;
                }
                Ok::<_, StorageError>(count)
            })
            .await;

            match result {
                Ok(count) => {
                    info!("Completed {} occupants of {}", count, day.date);
                    completed += count;
                }
                Err(err) => error!("Failed to complete day {}: {:#}", day.date, err),
            }
        }
        Ok(completed)
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid window: {0}")]
    InvalidWindow(#[from] WindowError),
    #[error("Trainer not available at this time")]
    TrainerUnavailable,
    #[error("Trainer already has a session at this time")]
    TrainerConflict,
    #[error("No rooms available at this time")]
    NoRoomAvailable,
    #[error("Overlapping availability exists")]
    AvailabilityOverlap,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CommitError> for BookingError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::TrainerConflict(_) => BookingError::TrainerConflict,
            CommitError::RoomConflict(_) => BookingError::NoRoomAvailable,
            CommitError::AvailabilityOverlap(_) => BookingError::AvailabilityOverlap,
            CommitError::Storage(err) => BookingError::Storage(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(ObjectId),
    #[error("Session is {from}, can't become {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
