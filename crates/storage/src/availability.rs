use log::debug;
use model::{availability::TrainerCalendar, errors::StorageError};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};

use crate::session::is_duplicate_key;

const COLLECTION: &str = "availability";

#[derive(Clone)]
pub struct AvailabilityStore {
    pub(crate) store: Collection<TrainerCalendar>,
}

impl AvailabilityStore {
    pub(crate) fn new(db: &Database) -> Self {
        AvailabilityStore {
            store: db.collection(COLLECTION),
        }
    }

    pub async fn get(&self, trainer_id: ObjectId) -> Result<TrainerCalendar, StorageError> {
        let calendar = self.store.find_one(doc! { "_id": trainer_id }).await?;
        Ok(calendar.unwrap_or_else(|| TrainerCalendar::new(trainer_id)))
    }

    pub async fn put(&self, calendar: &mut TrainerCalendar) -> Result<bool, StorageError> {
        let expected = calendar.version;
        let mut next = calendar.clone();
        next.version = expected + 1;

        if expected == 0 {
            match self.store.insert_one(&next).await {
                Ok(_) => {}
                Err(err) if is_duplicate_key(&err) => {
                    debug!("Calendar of {} was created concurrently", calendar.trainer_id);
                    return Ok(false);
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            let filter = doc! { "_id": calendar.trainer_id, "version": expected as i64 };
            let result = self.store.replace_one(filter, &next).await?;
            if result.matched_count != 1 {
                debug!("Calendar of {} version {} is stale", calendar.trainer_id, expected);
                return Ok(false);
            }
        }

        calendar.version = next.version;
        Ok(true)
    }
}
