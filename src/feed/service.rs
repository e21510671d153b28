//! Feed service.
//!
//! Subscription management, feed metadata lookups through the TTL cache,
//! article reads and retention cleanup.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::fetcher::validate_url;
use super::refresher::{FeedRefresher, RefreshOutcome, FEED_META_SCOPE};
use super::repository::{ArticleRepository, FeedRepository};
use super::types::{Article, Feed, FeedFlags, NewFeed};
use crate::cache::TtlCache;
use crate::db::Database;
use crate::{Result, RssyError};

/// Service for feed operations.
#[derive(Clone)]
pub struct FeedService {
    db: Database,
    refresher: Arc<FeedRefresher>,
    cache: Arc<TtlCache<i64, Feed>>,
}

impl FeedService {
    /// Create a new service.
    pub fn new(
        db: Database,
        refresher: Arc<FeedRefresher>,
        cache: Arc<TtlCache<i64, Feed>>,
    ) -> Self {
        Self {
            db,
            refresher,
            cache,
        }
    }

    /// The refresh pipeline shared with the scheduler.
    pub fn refresher(&self) -> &Arc<FeedRefresher> {
        &self.refresher
    }

    /// Subscribe `owner` to the feed at `url` and run a first ingestion.
    ///
    /// An existing subscription is reused. The document is fetched once; fetch
    /// errors are returned to the caller.
    pub async fn subscribe(
        &self,
        url: &str,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<(Feed, RefreshOutcome)> {
        validate_url(url)?;
        if owner.trim().is_empty() {
            return Err(RssyError::Validation("owner must not be empty".into()));
        }

        let parsed = self.refresher.source().fetch(url).await?;

        let repo = FeedRepository::new(self.db.pool());
        let feed = repo
            .get_or_create(&NewFeed::new(url, &parsed.title, owner), now.timestamp())
            .await?;

        let outcome = self.refresher.ingest_parsed(&feed, &parsed, now).await?;
        self.cache.invalidate(FEED_META_SCOPE, &feed.id);
        info!("{} subscribed to feed {} ({})", owner, feed.id, url);

        let feed = repo
            .get_by_id(feed.id)
            .await?
            .ok_or_else(|| RssyError::NotFound("feed".into()))?;
        Ok((feed, outcome))
    }

    /// List an owner's feeds.
    pub async fn list_feeds(&self, owner: &str) -> Result<Vec<Feed>> {
        FeedRepository::new(self.db.pool())
            .list_by_owner(owner)
            .await
    }

    /// Get feed metadata, served from the cache when possible.
    pub async fn feed_meta(&self, feed_id: i64) -> Result<Feed> {
        if let Some(feed) = self.cache.get(FEED_META_SCOPE, &feed_id) {
            return Ok(feed);
        }

        let feed = FeedRepository::new(self.db.pool())
            .get_by_id(feed_id)
            .await?
            .ok_or_else(|| RssyError::NotFound("feed".into()))?;
        self.cache.insert(FEED_META_SCOPE, feed_id, feed.clone());
        Ok(feed)
    }

    async fn owned_feed(&self, feed_id: i64, owner: &str) -> Result<Feed> {
        let feed = self.feed_meta(feed_id).await?;
        if feed.owner != owner {
            return Err(RssyError::NotFound("feed".into()));
        }
        Ok(feed)
    }

    /// Update an owner's feed flags.
    pub async fn update_flags(&self, feed_id: i64, owner: &str, flags: &FeedFlags) -> Result<bool> {
        self.owned_feed(feed_id, owner).await?;
        let updated = FeedRepository::new(self.db.pool())
            .update_flags(feed_id, flags)
            .await?;
        self.cache.invalidate(FEED_META_SCOPE, &feed_id);
        Ok(updated)
    }

    /// Delete an owner's feed and its articles.
    pub async fn delete_feed(&self, feed_id: i64, owner: &str) -> Result<bool> {
        self.owned_feed(feed_id, owner).await?;
        let deleted = FeedRepository::new(self.db.pool()).delete(feed_id).await?;
        self.cache.invalidate(FEED_META_SCOPE, &feed_id);
        if deleted {
            info!("{} deleted feed {}", owner, feed_id);
        }
        Ok(deleted)
    }

    /// Mark an article read and return it.
    pub async fn read_article(&self, uid: &str, owner: &str) -> Result<Article> {
        let repo = ArticleRepository::new(self.db.pool());
        if !repo.mark_read(uid, owner).await? {
            return Err(RssyError::NotFound("article".into()));
        }
        repo.get(uid)
            .await?
            .ok_or_else(|| RssyError::NotFound("article".into()))
    }

    /// Delete read articles published more than `days` days before `now`.
    pub async fn cleanup_expired(&self, owner: &str, days: i64, now: DateTime<Utc>) -> Result<u64> {
        if days <= 0 {
            return Err(RssyError::Validation(
                "cleanup days must be greater than 0".into(),
            ));
        }
        let cutoff = (now - Duration::days(days)).timestamp();
        let deleted = ArticleRepository::new(self.db.pool())
            .delete_read_before(owner, cutoff)
            .await?;
        info!("Deleted {} expired article(s) for {}", deleted, owner);
        Ok(deleted)
    }

    /// Delete all read articles.
    pub async fn cleanup_read(&self, owner: &str) -> Result<u64> {
        let deleted = ArticleRepository::new(self.db.pool())
            .delete_read(owner)
            .await?;
        info!("Deleted {} read article(s) for {}", deleted, owner);
        Ok(deleted)
    }
}
