use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::Weekday;
use log::info;
use model::{availability::AvailabilitySlot, errors::StorageError, window::TimeRange};
use storage::BookingStore;

use super::booking::BookingError;

/// Weekly availability registration.
#[derive(Clone)]
pub struct Availability {
    store: Arc<dyn BookingStore>,
}

impl Availability {
    pub(crate) fn new(store: Arc<dyn BookingStore>) -> Self {
        Availability { store }
    }

    /// Adds a recurring weekly slot. Fails with `AvailabilityOverlap` and
    /// changes nothing if it overlaps another slot of the trainer on that weekday.
    pub async fn add_availability(
        &self,
        trainer_id: ObjectId,
        weekday: Weekday,
        range: TimeRange,
    ) -> Result<AvailabilitySlot, BookingError> {
        let range = TimeRange::new(range.start, range.end)?;
        let slot = self
            .store
            .create_availability(trainer_id, weekday, range)
            .await?;
        info!("Trainer {} available on {} {}", trainer_id, weekday, range);
        Ok(slot)
    }

    /// All slots of the trainer, Monday first, then by start time.
    pub async fn trainer_availability(
        &self,
        trainer_id: ObjectId,
    ) -> Result<Vec<AvailabilitySlot>, StorageError> {
        Ok(self.store.load_calendar(trainer_id).await?.sorted())
    }
}
