use std::sync::Arc;

use club::{Club, SchedulerConfig};
use env::Env;
use eyre::Context;
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let env = Env::load()?;
    pretty_env_logger::init();
    color_eyre::install()?;
    if let Some(err) = env.dotenv_error() {
        info!("Failed to load .env file: {}", err);
    }

    info!("connecting to mongo");
    let storage = storage::Storage::new(env.mongo_url(), env.mongo_db())
        .await
        .context("Failed to create storage")?;

    info!("creating club");
    let club = Club::new(
        Arc::new(storage),
        SchedulerConfig {
            allow_past_dates: env.allow_past_bookings(),
            completion_lookback_days: env.completion_lookback_days(),
        },
    );

    info!("Starting background tasks...");
    let mut sched = bg_process::start(club, env.completion_cron()).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    info!("Shutting down");
    sched
        .shutdown()
        .await
        .map_err(|err| eyre::eyre!("Failed to stop scheduler: {:?}", err))?;
    Ok(())
}
