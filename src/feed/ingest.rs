//! Candidate selection and the ingestion transaction.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::dedup::DedupIndex;
use super::filter::is_recent;
use super::repository::insert_batch;
use super::types::{Feed, NewArticle, ParsedItem};
use crate::db::DbPool;
use crate::Result;

/// Items accepted for insertion plus what was skipped.
#[derive(Debug, Default)]
pub struct Candidates {
    /// Articles to insert.
    pub articles: Vec<NewArticle>,
    /// Items rejected by the recency filter.
    pub stale: usize,
    /// Items whose title was already known.
    pub duplicates: usize,
}

/// Run the recency filter and dedup index over parsed items.
///
/// Accepted titles are added to `index`, so a title repeated within one
/// document yields a single article.
pub fn select_candidates(
    feed: &Feed,
    source_name: &str,
    items: &[ParsedItem],
    index: &mut DedupIndex,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Candidates {
    let mut candidates = Candidates::default();

    for item in items {
        if !is_recent(item.published, feed.last_fetched_at, now, lookback) {
            candidates.stale += 1;
            continue;
        }
        if !index.insert(&item.title) {
            debug!("Feed {}: skipping duplicate title {:?}", feed.id, item.title);
            candidates.duplicates += 1;
            continue;
        }
        if let Some(article) = NewArticle::from_item(feed, source_name, item) {
            candidates.articles.push(article);
        }
    }

    candidates
}

/// Persist articles and advance the feed's watermark in one transaction.
///
/// The watermark is written only after every insert succeeded; any error rolls
/// the transaction back and leaves the watermark unchanged. An empty article
/// list still advances the watermark. The watermark never moves backwards: a
/// commit with an older `now` keeps the stored value.
pub async fn commit(pool: &DbPool, feed_id: i64, articles: &[NewArticle], now: i64) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let inserted = insert_batch(&mut tx, articles, now).await?;

    sqlx::query("UPDATE feeds SET last_fetched_at = MAX(last_fetched_at, ?) WHERE id = ?")
        .bind(now)
        .bind(feed_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(inserted)
}
