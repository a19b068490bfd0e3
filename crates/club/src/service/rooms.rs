use std::sync::Arc;

use bson::oid::ObjectId;
use log::info;
use model::{
    errors::StorageError,
    rooms::{Room, RoomType},
};
use storage::BookingStore;

#[derive(Clone)]
pub struct Rooms {
    store: Arc<dyn BookingStore>,
}

impl Rooms {
    pub(crate) fn new(store: Arc<dyn BookingStore>) -> Self {
        Rooms { store }
    }

    pub async fn add_room(
        &self,
        name: String,
        tp: RoomType,
        capacity: u32,
    ) -> Result<Room, StorageError> {
        let room = Room::new(name, tp, capacity);
        self.store.insert_room(&room).await?;
        info!("Room added: {} ({})", room.name, room.tp);
        Ok(room)
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<Room>, StorageError> {
        self.store.get_room(id).await
    }

    /// Rooms ordered by id, optionally restricted to one type.
    pub async fn rooms(&self, tp: Option<RoomType>) -> Result<Vec<Room>, StorageError> {
        self.store.list_rooms(tp).await
    }
}
