//! Auto-cleanup job.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use super::job::Job;
use crate::feed::FeedService;
use crate::preference::PreferenceService;
use crate::Result;

/// Deletes old read articles for users with auto-cleanup enabled.
pub struct CleanupJob {
    prefs: PreferenceService,
    feeds: FeedService,
    period: Duration,
}

impl CleanupJob {
    /// Create the job.
    pub fn new(prefs: PreferenceService, feeds: FeedService, period: Duration) -> Self {
        Self {
            prefs,
            feeds,
            period,
        }
    }

    /// Run one cleanup pass. Returns the number of articles deleted.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut deleted = 0;
        for pref in self.prefs.list_auto_cleanup().await? {
            match self
                .feeds
                .cleanup_expired(&pref.owner, pref.cleanup_expired_days, now)
                .await
            {
                Ok(n) => deleted += n,
                Err(e) => error!("Cleanup for {} failed: {}", pref.owner, e),
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl Job for CleanupJob {
    fn name(&self) -> &'static str {
        "auto-cleanup"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&self, now: DateTime<Utc>) {
        if let Err(e) = self.run_once(now).await {
            error!("Cleanup tick failed: {}", e);
        }
    }
}
