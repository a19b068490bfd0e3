use chrono::{Datelike as _, NaiveDate};
use futures_util::stream::TryStreamExt as _;
use log::debug;
use model::{day::Day, errors::StorageError};
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use crate::session::is_duplicate_key;

const COLLECTION: &str = "days";

#[derive(Clone)]
pub struct CalendarStore {
    pub(crate) store: Collection<Day>,
}

impl CalendarStore {
    pub(crate) async fn new(db: &Database) -> eyre::Result<Self> {
        let days = db.collection(COLLECTION);
        let index = IndexModel::builder()
            .keys(doc! { "date": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        days.create_index(index).await?;

        days.create_index(
            IndexModel::builder()
                .keys(doc! { "sessions._id": 1 })
                .build(),
        )
        .await?;

        days.create_index(
            IndexModel::builder()
                .keys(doc! { "classes._id": 1 })
                .build(),
        )
        .await?;

        Ok(CalendarStore { store: days })
    }

    pub async fn get_day(&self, date: NaiveDate) -> Result<Day, StorageError> {
        let day = self
            .store
            .find_one(doc! { "date": date.to_string() })
            .await?;
        Ok(day.unwrap_or_else(|| Day::new(date)))
    }

    /// Writes the day if nobody has changed it since it was read.
    pub async fn put_day(&self, day: &mut Day) -> Result<bool, StorageError> {
        let expected = day.version;
        let mut next = day.clone();
        next.version = expected + 1;

        if expected == 0 {
            match self.store.insert_one(&next).await {
                Ok(_) => {}
                Err(err) if is_duplicate_key(&err) => {
                    debug!("Day {} was created concurrently", day.date);
                    return Ok(false);
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            let result = self
                .store
                .replace_one(doc! { "_id": day.id, "version": expected as i64 }, &next)
                .await?;
            if result.matched_count != 1 {
                debug!("Day {} version {} is stale", day.date, expected);
                return Ok(false);
            }
        }

        day.version = next.version;
        Ok(true)
    }

    pub async fn find_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Day>, StorageError> {
        // Dates are stored as "YYYY-MM-DD" strings, which only order correctly for four-digit years.
        let mut bounds = doc! {};
        if from.year() >= 0 {
            bounds.insert("$gte", from.to_string());
        }
        if to.year() <= 9999 {
            bounds.insert("$lte", to.to_string());
        }
        let filter = if bounds.is_empty() {
            doc! {}
        } else {
            doc! { "date": bounds }
        };
        let cursor = self.store.find(filter).sort(doc! { "date": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_session(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        Ok(self.store.find_one(doc! { "sessions._id": id }).await?)
    }

    pub async fn find_by_class(&self, id: ObjectId) -> Result<Option<Day>, StorageError> {
        Ok(self.store.find_one(doc! { "classes._id": id }).await?)
    }
}
