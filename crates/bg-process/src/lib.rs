use std::sync::Arc;

use async_trait::async_trait;
use club::Club;
use eyre::{eyre, Error, Result};
use log::{error, info};
use process::completion::CompletionBg;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

pub mod process;

#[async_trait]
pub trait Task {
    const NAME: &'static str;

    fn cron(&self) -> &str;

    async fn process(&mut self) -> Result<(), Error>;
}

/// Registers the background tasks and starts the scheduler.
pub async fn start(club: Club, completion_cron: &str) -> Result<JobScheduler> {
    let sched = JobScheduler::new()
        .await
        .map_err(|err| eyre!("Failed to create scheduler: {:?}", err))?;

    add_task(&sched, CompletionBg::new(club, completion_cron.to_string())).await?;

    sched
        .start()
        .await
        .map_err(|err| eyre!("Failed to start scheduler: {:?}", err))?;
    Ok(sched)
}

async fn add_task<T: Task + Send + 'static>(sched: &JobScheduler, task: T) -> Result<()> {
    let cron = task.cron().to_string();
    let task = Arc::new(Mutex::new(task));
    let job = Job::new_async(cron.as_str(), move |_, _| {
        let task = task.clone();
        Box::pin(async move {
            let mut task = task.lock().await;
            info!("Running {}", T::NAME);
            if let Err(err) = task.process().await {
                error!("Error in background process {}: {:#}", T::NAME, err);
            }
        })
    })
    .map_err(|err| eyre!("Failed to create job {}: {:?}", T::NAME, err))?;

    sched
        .add(job)
        .await
        .map_err(|err| eyre!("Failed to add job {}: {:?}", T::NAME, err))?;
    info!("Task {} scheduled: {}", T::NAME, cron);
    Ok(())
}
