//! Background jobs.
//!
//! Every job runs on its own tokio task driven by an interval timer. All
//! tasks share one cancellation token; [`Scheduler::shutdown`] cancels it
//! and waits for the tasks to finish their current tick.

pub mod cleanup;
pub mod daily;
pub mod job;
pub mod marker;
pub mod notify;
pub mod refresh;
pub mod summary;
pub mod window;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use cleanup::CleanupJob;
pub use daily::DailyTrigger;
pub use job::{spawn_job, Job};
pub use marker::DailyMarker;
pub use notify::NotifyJob;
pub use refresh::RefreshJob;
pub use summary::SummaryJob;
pub use window::{TimeParseError, TriggerTime};

/// Owns the running job tasks.
#[derive(Default)]
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Create a scheduler with no jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled on shutdown. Other background tasks may share it.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start a job.
    pub fn spawn(&mut self, job: Arc<dyn Job>) {
        self.handles.push(spawn_job(job, self.cancel.clone()));
    }

    /// Track a task started elsewhere so shutdown waits for it.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no tasks are tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel all jobs and wait for them to stop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
        info!("Scheduler stopped");
    }
}
