//! Feed ingestion.
//!
//! Fetching, recency filtering, title deduplication and the transactional
//! commit of new articles, plus subscription management.

pub mod dedup;
pub mod fetcher;
pub mod filter;
pub mod ingest;
pub mod refresher;
pub mod repository;
pub mod service;
pub mod types;

pub use dedup::DedupIndex;
pub use fetcher::{fetch_or_empty, parse_feed, validate_url, FeedFetcher, FeedSource};
pub use filter::is_recent;
pub use ingest::{commit, select_candidates, Candidates};
pub use refresher::{CycleSummary, FeedRefresher, RefreshOutcome};
pub use repository::{ArticleRepository, FeedRepository, INSERT_BATCH_SIZE};
pub use service::FeedService;
pub use types::{
    Article, Feed, FeedFlags, NewArticle, NewFeed, ParsedFeed, ParsedItem, DEFAULT_PRIORITY,
};
