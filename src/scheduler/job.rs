//! Periodic job runner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A unit of periodic background work.
#[async_trait]
pub trait Job: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Time between ticks.
    fn period(&self) -> Duration;

    /// Run one tick. Errors are handled inside the job.
    async fn tick(&self, now: DateTime<Utc>);
}

/// Spawn `job` on its own task, ticking every period until `cancel` fires.
///
/// The first tick happens one period after start. A tick in progress when
/// the token is cancelled runs to completion.
pub fn spawn_job(job: Arc<dyn Job>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = job.period();
        info!(
            "Job {} started (period: {} seconds)",
            job.name(),
            period.as_secs()
        );

        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = timer.tick() => {
                    debug!("Job {} tick", job.name());
                    job.tick(Utc::now()).await;
                }
            }
        }

        info!("Job {} stopped", job.name());
    })
}
