use futures_util::stream::TryStreamExt as _;
use log::info;
use model::{
    errors::StorageError,
    rooms::{Room, RoomType},
};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database, IndexModel,
};

const COLLECTION: &str = "rooms";

#[derive(Clone)]
pub struct RoomStore {
    pub(crate) store: Collection<Room>,
}

impl RoomStore {
    pub(crate) async fn new(db: &Database) -> eyre::Result<Self> {
        let rooms = db.collection(COLLECTION);
        rooms
            .create_index(IndexModel::builder().keys(doc! { "tp": 1 }).build())
            .await?;
        Ok(RoomStore { store: rooms })
    }

    pub async fn insert(&self, room: &Room) -> Result<(), StorageError> {
        info!("Insert room: {:?}", room);
        self.store.insert_one(room).await?;
        Ok(())
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<Room>, StorageError> {
        Ok(self.store.find_one(doc! { "_id": id }).await?)
    }

    /// Rooms ordered by id.
    pub async fn find(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError> {
        let filter = match tp {
            Some(tp) => doc! { "tp": tp.to_string() },
            None => doc! {},
        };
        let cursor = self.store.find(filter).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }
}
