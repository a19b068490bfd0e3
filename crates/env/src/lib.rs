use std::{env::var, str::FromStr, sync::Arc};

use dotenv::dotenv;
use eyre::{eyre, Context, Error};

const DEFAULT_DB: &str = "club_db";
const DEFAULT_COMPLETION_CRON: &str = "0 */10 * * * *";
const DEFAULT_LOOKBACK_DAYS: u32 = 7;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    mongo_url: String,
    mongo_db: String,
    allow_past_bookings: bool,
    completion_cron: String,
    completion_lookback_days: u32,
    dotenv_error: Option<String>,
}

impl Env {
    pub fn mongo_url(&self) -> &str {
        &self.0.mongo_url
    }

    pub fn mongo_db(&self) -> &str {
        &self.0.mongo_db
    }

    pub fn allow_past_bookings(&self) -> bool {
        self.0.allow_past_bookings
    }

    pub fn completion_cron(&self) -> &str {
        &self.0.completion_cron
    }

    pub fn completion_lookback_days(&self) -> u32 {
        self.0.completion_lookback_days
    }

    /// Why `.env` was not loaded, if it wasn't. Kept for the caller to log once logging is up.
    pub fn dotenv_error(&self) -> Option<&str> {
        self.0.dotenv_error.as_deref()
    }

    pub fn load() -> Result<Env, Error> {
        let dotenv_error = dotenv().err().map(|err| err.to_string());

        Ok(Env(Arc::new(EnvInner {
            mongo_url: var("MONGO_URL").context("MONGO_URL is not set")?,
            mongo_db: var("MONGO_DB").unwrap_or_else(|_| DEFAULT_DB.to_string()),
            allow_past_bookings: parse_or("ALLOW_PAST_BOOKINGS", false)?,
            completion_cron: var("COMPLETION_CRON")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_CRON.to_string()),
            completion_lookback_days: parse_or("COMPLETION_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?,
            dotenv_error,
        })))
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, Error> {
    match var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| eyre!("{} has invalid value: {}", key, value)),
        Err(_) => Ok(default),
    }
}
