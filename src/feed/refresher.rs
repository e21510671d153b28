//! Per-feed refresh pipeline.
//!
//! Fetch, filter, deduplicate and commit one feed. A refresh cycle runs the
//! pipeline over many feeds through a bounded worker pool.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use super::dedup::DedupIndex;
use super::fetcher::{fetch_or_empty, FeedSource};
use super::ingest::{commit, select_candidates};
use super::repository::{ArticleRepository, FeedRepository};
use super::types::{Feed, ParsedFeed};
use crate::cache::TtlCache;
use crate::db::Database;
use crate::Result;

/// Result of refreshing one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The pipeline ran and committed.
    Ingested {
        /// Articles inserted.
        inserted: u64,
        /// Items rejected by the recency filter.
        stale: usize,
        /// Items skipped as duplicates.
        duplicates: usize,
    },
    /// Another refresh of the same feed was in progress.
    InFlight,
}

/// Totals for one refresh cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Feeds that went through the pipeline.
    pub refreshed: usize,
    /// Feeds skipped because their watermark is too recent.
    pub not_due: usize,
    /// Feeds skipped because a refresh was already running.
    pub in_flight: usize,
    /// Feeds whose commit failed.
    pub failed: usize,
    /// Articles inserted across all feeds.
    pub inserted: u64,
}

/// Removes a feed from the in-flight set when dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    feed_id: i64,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<i64>>, feed_id: i64) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(feed_id);
        if inserted {
            Some(Self { set, feed_id })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.feed_id);
    }
}

/// Cache scope for feed rows served by `FeedService::feed_meta`.
pub(crate) const FEED_META_SCOPE: &str = "feed_meta";

/// Runs the ingestion pipeline for feeds.
pub struct FeedRefresher {
    db: Database,
    source: Arc<dyn FeedSource>,
    cache: Arc<TtlCache<i64, Feed>>,
    lookback: Duration,
    in_flight: Mutex<HashSet<i64>>,
}

impl FeedRefresher {
    /// Create a refresher with the given cold-start lookback window.
    ///
    /// `cache` holds feed rows; entries are dropped whenever ingestion
    /// rewrites the title or the watermark.
    pub fn new(
        db: Database,
        source: Arc<dyn FeedSource>,
        cache: Arc<TtlCache<i64, Feed>>,
        lookback_days: i64,
    ) -> Self {
        Self {
            db,
            source,
            cache,
            lookback: Duration::days(lookback_days),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying feed source.
    pub fn source(&self) -> &dyn FeedSource {
        self.source.as_ref()
    }

    /// Fetch a feed document. Failures are logged and yield an empty feed.
    pub async fn fetch(&self, url: &str) -> ParsedFeed {
        fetch_or_empty(self.source.as_ref(), url).await
    }

    /// Fetch and ingest one feed.
    pub async fn refresh_feed(&self, feed: &Feed, now: DateTime<Utc>) -> Result<RefreshOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, feed.id) else {
            debug!("Feed {} is already being refreshed", feed.id);
            return Ok(RefreshOutcome::InFlight);
        };

        let parsed = self.fetch(&feed.url).await;
        self.ingest(feed, &parsed, now).await
    }

    /// Ingest an already fetched document for a feed.
    pub async fn ingest_parsed(
        &self,
        feed: &Feed,
        parsed: &ParsedFeed,
        now: DateTime<Utc>,
    ) -> Result<RefreshOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, feed.id) else {
            return Ok(RefreshOutcome::InFlight);
        };
        self.ingest(feed, parsed, now).await
    }

    async fn ingest(
        &self,
        feed: &Feed,
        parsed: &ParsedFeed,
        now: DateTime<Utc>,
    ) -> Result<RefreshOutcome> {
        let pool = self.db.pool();

        let source_name = if parsed.title.is_empty() {
            feed.title.clone()
        } else {
            if parsed.title != feed.title {
                FeedRepository::new(pool)
                    .update_title(feed.id, &parsed.title)
                    .await?;
                self.cache.invalidate(FEED_META_SCOPE, &feed.id);
            }
            parsed.title.clone()
        };

        let titles = ArticleRepository::new(pool)
            .titles_for_feed(feed.id, &feed.owner)
            .await?;
        let mut index = DedupIndex::new(titles);

        let candidates = select_candidates(
            feed,
            &source_name,
            &parsed.items,
            &mut index,
            now,
            self.lookback,
        );

        let inserted = commit(pool, feed.id, &candidates.articles, now.timestamp()).await?;
        self.cache.invalidate(FEED_META_SCOPE, &feed.id);

        if inserted > 0 {
            info!(
                "Feed {} ({}): {} new article(s)",
                feed.id, feed.owner, inserted
            );
        } else {
            debug!("Feed {} ({}): no new articles", feed.id, feed.owner);
        }

        Ok(RefreshOutcome::Ingested {
            inserted,
            stale: candidates.stale,
            duplicates: candidates.duplicates,
        })
    }

    /// Refresh every due feed with at most `concurrency` feeds in flight.
    ///
    /// Feeds whose watermark is younger than `min_refetch_secs` are skipped.
    /// A failure on one feed is logged and does not affect the others.
    pub async fn refresh_due(
        &self,
        feeds: Vec<Feed>,
        now: DateTime<Utc>,
        min_refetch_secs: i64,
        concurrency: usize,
    ) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let ts = now.timestamp();

        let (due, not_due): (Vec<Feed>, Vec<Feed>) = feeds
            .into_iter()
            .partition(|feed| feed.is_due_for_fetch(ts, min_refetch_secs));
        summary.not_due = not_due.len();

        let results: Vec<(i64, Result<RefreshOutcome>)> = stream::iter(due)
            .map(|feed| async move {
                let result = self.refresh_feed(&feed, now).await;
                (feed.id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        for (feed_id, result) in results {
            match result {
                Ok(RefreshOutcome::Ingested { inserted, .. }) => {
                    summary.refreshed += 1;
                    summary.inserted += inserted;
                }
                Ok(RefreshOutcome::InFlight) => summary.in_flight += 1,
                Err(e) => {
                    error!("Failed to refresh feed {}: {}", feed_id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
