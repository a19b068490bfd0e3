use std::ops::Deref;

use bson::doc;
use eyre::{Context as _, Error};
use log::info;
use mongodb::{Client, Database};

#[derive(Clone)]
pub struct Db {
    _client: Client,
    db: Database,
}

impl Db {
    pub(crate) async fn new(uri: &str, db_name: &str) -> Result<Self, Error> {
        info!("Connecting to database {}", db_name);
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let db = client.database(db_name);
        let db = Db {
            _client: client,
            db,
        };
        db.ping().await?;
        Ok(db)
    }

    pub async fn ping(&self) -> Result<(), Error> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to ping MongoDB")?;
        Ok(())
    }
}

impl Deref for Db {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == 11000
    )
}
