use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum RoomType {
    PersonalTraining,
    GroupClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub tp: RoomType,
    pub capacity: u32,
}

impl Room {
    pub fn new(name: String, tp: RoomType, capacity: u32) -> Room {
        Room {
            id: ObjectId::new(),
            name,
            tp,
            capacity,
        }
    }
}
