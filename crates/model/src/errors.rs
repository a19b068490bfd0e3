use thiserror::Error;

/// Opaque persistence failure.
#[derive(Error, Debug)]
#[error("Storage error: {0:#}")]
pub struct StorageError(#[from] eyre::Error);

impl StorageError {
    pub fn msg(msg: impl Into<String>) -> StorageError {
        StorageError(eyre::eyre!(msg.into()))
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(e: mongodb::error::Error) -> Self {
        StorageError(e.into())
    }
}

impl From<bson::ser::Error> for StorageError {
    fn from(e: bson::ser::Error) -> Self {
        StorageError(e.into())
    }
}

impl From<bson::de::Error> for StorageError {
    fn from(e: bson::de::Error) -> Self {
        StorageError(e.into())
    }
}
