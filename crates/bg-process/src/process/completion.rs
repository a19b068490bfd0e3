use async_trait::async_trait;
use chrono::Local;
use club::Club;
use eyre::{Context as _, Error, Result};
use log::info;

use crate::Task;

/// Flips finished sessions and classes to completed.
pub struct CompletionBg {
    club: Club,
    cron: String,
}

impl CompletionBg {
    pub fn new(club: Club, cron: String) -> CompletionBg {
        CompletionBg { club, cron }
    }
}

#[async_trait]
impl Task for CompletionBg {
    const NAME: &'static str = "completion";

    fn cron(&self) -> &str {
        &self.cron
    }

    async fn process(&mut self) -> Result<(), Error> {
        let now = Local::now().naive_local();
        let completed = self
            .club
            .scheduler
            .complete_finished(now)
            .await
            .context("complete_finished")?;
        if completed > 0 {
            info!("Completed {} sessions and classes", completed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bson::oid::ObjectId;
    use chrono::{Datelike as _, Duration, NaiveTime};
    use club::SchedulerConfig;
    use model::{
        rooms::{Room, RoomType},
        session::BookingStatus,
        window::{TimeRange, TimeWindow},
    };
    use storage::{BookingStore as _, MemoryStore};

    use super::*;

    fn range(from: u32, to: u32) -> TimeRange {
        TimeRange::new(
            NaiveTime::from_hms_opt(from, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(to, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_completes_yesterday_sessions() {
        let store = Arc::new(MemoryStore::new());
        let club = Club::new(
            store.clone(),
            SchedulerConfig {
                allow_past_dates: true,
                completion_lookback_days: 7,
            },
        );
        store
            .insert_room(&Room::new("Studio".to_string(), RoomType::PersonalTraining, 2))
            .await
            .unwrap();

        let yesterday = Local::now().date_naive() - Duration::days(1);
        let trainer = ObjectId::new();
        club.availability
            .add_availability(trainer, yesterday.weekday(), range(8, 20))
            .await
            .unwrap();
        let session = club
            .scheduler
            .request_booking(
                ObjectId::new(),
                trainer,
                TimeWindow::with_range(yesterday, range(10, 11)),
            )
            .await
            .unwrap();

        let mut task = CompletionBg::new(club.clone(), "0 */10 * * * *".to_string());
        task.process().await.unwrap();

        let session = club.scheduler.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(session.status, BookingStatus::Completed);
    }
}
