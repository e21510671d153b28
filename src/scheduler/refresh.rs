//! Feed refresh job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::job::Job;
use crate::config::SchedulerConfig;
use crate::db::Database;
use crate::feed::{CycleSummary, Feed, FeedRefresher, FeedRepository};
use crate::Result;

/// Periodically refreshes every due feed.
pub struct RefreshJob {
    db: Database,
    refresher: Arc<FeedRefresher>,
    users: Vec<String>,
    period: Duration,
    min_refetch_secs: i64,
    concurrency: usize,
}

impl RefreshJob {
    /// Create the job from scheduler settings.
    pub fn new(db: Database, refresher: Arc<FeedRefresher>, config: &SchedulerConfig) -> Self {
        Self {
            db,
            refresher,
            users: config.users.clone(),
            period: Duration::from_secs(config.refresh_interval_secs),
            min_refetch_secs: config.min_refetch_secs,
            concurrency: config.refresh_concurrency,
        }
    }

    /// Feeds of the configured users, or every feed when none are configured.
    async fn feeds(&self) -> Result<Vec<Feed>> {
        let repo = FeedRepository::new(self.db.pool());
        if self.users.is_empty() {
            return repo.list_all().await;
        }

        let mut feeds = Vec::new();
        for user in &self.users {
            match repo.list_by_owner(user).await {
                Ok(mut owned) => feeds.append(&mut owned),
                Err(e) => error!("Failed to list feeds for {}: {}", user, e),
            }
        }
        Ok(feeds)
    }

    /// Run one refresh cycle.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<CycleSummary> {
        let feeds = self.feeds().await?;
        let summary = self
            .refresher
            .refresh_due(feeds, now, self.min_refetch_secs, self.concurrency)
            .await;

        info!(
            "Refresh cycle: {} refreshed, {} not due, {} in flight, {} failed, {} new articles",
            summary.refreshed, summary.not_due, summary.in_flight, summary.failed, summary.inserted
        );
        Ok(summary)
    }
}

#[async_trait]
impl Job for RefreshJob {
    fn name(&self) -> &'static str {
        "feed-refresh"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&self, now: DateTime<Utc>) {
        if let Err(e) = self.run_once(now).await {
            error!("Feed refresh cycle failed: {}", e);
        }
    }
}
