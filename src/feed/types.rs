//! Feed and article types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default priority for newly subscribed feeds.
pub const DEFAULT_PRIORITY: i64 = 1;

/// A subscribed feed, owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Feed ID.
    pub id: i64,
    /// Feed URL.
    pub url: String,
    /// Feed title as reported by the source.
    pub title: String,
    /// Owner key (e-mail).
    pub owner: String,
    /// Display priority.
    pub priority: i64,
    /// Watermark: unix seconds of the last successful ingestion, 0 if never fetched.
    pub last_fetched_at: i64,
    /// Hide unread articles from listings.
    pub hide_unread: bool,
    /// Render articles through a readability extractor.
    pub enable_readability: bool,
    /// Include this feed's articles in daily notifications.
    pub highlight: bool,
    /// When the feed was created (unix seconds).
    pub created_at: i64,
}

impl Feed {
    /// Whether the watermark is old enough for another fetch.
    pub fn is_due_for_fetch(&self, now: i64, min_refetch_secs: i64) -> bool {
        now >= self.last_fetched_at + min_refetch_secs
    }
}

/// Feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Feed URL.
    pub url: String,
    /// Feed title.
    pub title: String,
    /// Owner key.
    pub owner: String,
}

impl NewFeed {
    /// Create a new feed.
    pub fn new(url: impl Into<String>, title: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            owner: owner.into(),
        }
    }
}

/// Feed flag update request.
#[derive(Debug, Clone, Default)]
pub struct FeedFlags {
    /// New priority.
    pub priority: Option<i64>,
    /// Hide unread articles.
    pub hide_unread: Option<bool>,
    /// Readability rendering.
    pub enable_readability: Option<bool>,
    /// Include in daily notifications.
    pub highlight: Option<bool>,
}

impl FeedFlags {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the hide-unread flag.
    pub fn with_hide_unread(mut self, hide_unread: bool) -> Self {
        self.hide_unread = Some(hide_unread);
        self
    }

    /// Set the readability flag.
    pub fn with_readability(mut self, enable: bool) -> Self {
        self.enable_readability = Some(enable);
        self
    }

    /// Set the highlight flag.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.hide_unread.is_none()
            && self.enable_readability.is_none()
            && self.highlight.is_none()
    }
}

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Generated unique ID.
    pub uid: String,
    /// Feed this article came from.
    pub feed_id: i64,
    /// Owner key.
    pub owner: String,
    /// Feed title at ingestion time.
    pub source_name: String,
    /// Article title.
    pub title: String,
    /// Link to the original article.
    pub link: String,
    /// Raw content.
    pub content: String,
    /// Whether the owner has read it.
    pub read: bool,
    /// Soft-deleted.
    pub deleted: bool,
    /// When the article was stored (unix seconds).
    pub created_at: i64,
    /// When the article was published (unix seconds).
    pub published_at: i64,
}

/// Article for creation. The uid is generated on construction.
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Unique ID.
    pub uid: String,
    /// Feed ID.
    pub feed_id: i64,
    /// Owner key.
    pub owner: String,
    /// Feed title.
    pub source_name: String,
    /// Article title.
    pub title: String,
    /// Link.
    pub link: String,
    /// Raw content.
    pub content: String,
    /// Publish time (unix seconds).
    pub published_at: i64,
}

impl NewArticle {
    /// Build an article for a feed from a parsed item.
    ///
    /// Returns `None` when the item has no publish time.
    pub fn from_item(feed: &Feed, source_name: &str, item: &ParsedItem) -> Option<Self> {
        let published = item.published?;
        Some(Self {
            uid: Uuid::new_v4().to_string(),
            feed_id: feed.id,
            owner: feed.owner.clone(),
            source_name: source_name.to_string(),
            title: item.title.clone(),
            link: item.link.clone().unwrap_or_default(),
            content: item.content.clone().unwrap_or_default(),
            published_at: published.timestamp(),
        })
    }
}

/// Parsed feed data from the remote source.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Feed title.
    pub title: String,
    /// Parsed items in document order.
    pub items: Vec<ParsedItem>,
}

impl ParsedFeed {
    /// Whether the document yielded no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parsed item data from the remote source.
#[derive(Debug, Clone, Default)]
pub struct ParsedItem {
    /// Item title.
    pub title: String,
    /// First link.
    pub link: Option<String>,
    /// Raw content body, else the summary.
    pub content: Option<String>,
    /// Publish time, else update time.
    pub published: Option<DateTime<Utc>>,
}

impl ParsedItem {
    /// Create an item with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the publish time.
    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }
}
