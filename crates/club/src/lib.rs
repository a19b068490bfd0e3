use std::sync::Arc;

use service::{
    availability::Availability, booking::Scheduler, classes::Classes, rooms::Rooms,
    schedule::ScheduleViews,
};
use storage::BookingStore;
use tokio::sync::Mutex;

pub mod service;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Admit windows on dates before today.
    pub allow_past_dates: bool,
    /// How many past days the completion pass scans.
    pub completion_lookback_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            allow_past_dates: false,
            completion_lookback_days: 7,
        }
    }
}

#[derive(Clone)]
pub struct Club {
    pub scheduler: Scheduler,
    pub availability: Availability,
    pub classes: Classes,
    pub rooms: Rooms,
    pub schedule: ScheduleViews,
}

impl Club {
    pub fn new(store: Arc<dyn BookingStore>, config: SchedulerConfig) -> Self {
        // Single admission point for everything that occupies a trainer or a room.
        let admission = Arc::new(Mutex::new(()));
        let scheduler = Scheduler::new(store.clone(), config, admission.clone());
        let availability = Availability::new(store.clone());
        let classes = Classes::new(store.clone(), config, admission);
        let rooms = Rooms::new(store.clone());
        let schedule = ScheduleViews::new(store);
        Club {
            scheduler,
            availability,
            classes,
            rooms,
            schedule,
        }
    }
}
