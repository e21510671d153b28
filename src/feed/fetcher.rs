//! Feed fetcher.
//!
//! Fetches RSS/Atom documents over HTTP with bounded timeouts and size
//! limits, and parses them into [`ParsedFeed`] values.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::warn;

use crate::config::FeedConfig;
use crate::error::{Result, RssyError};
use crate::feed::types::{ParsedFeed, ParsedItem};

/// Read timeout in seconds.
const READ_TIMEOUT_SECS: u64 = 20;

/// Source of parsed feed documents.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    async fn fetch(&self, url: &str) -> Result<ParsedFeed>;
}

/// HTTP feed fetcher backed by reqwest and feed-rs.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    max_feed_size: u64,
}

impl FeedFetcher {
    /// Create a fetcher from the feed configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RssyError::Feed(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
        })
    }

    fn too_large(&self, size: u64) -> RssyError {
        RssyError::Feed(format!(
            "feed too large: {} bytes (max {} bytes)",
            size, self.max_feed_size
        ))
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RssyError::Feed(format!("failed to fetch feed: {e}")))?;

        if !response.status().is_success() {
            return Err(RssyError::Feed(format!("HTTP error: {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(self.too_large(content_length));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RssyError::Feed(format!("failed to read response: {e}")))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(self.too_large(bytes.len() as u64));
        }

        parse_feed(&bytes)
    }
}

/// Fetch a feed, turning any failure into an empty result.
///
/// The error is logged with the URL. Callers cannot tell "no new items" from
/// "fetch failed"; either way nothing is ingested.
pub async fn fetch_or_empty(source: &dyn FeedSource, url: &str) -> ParsedFeed {
    match source.fetch(url).await {
        Ok(feed) => feed,
        Err(e) => {
            warn!("Failed to fetch feed {}: {}", url, e);
            ParsedFeed::default()
        }
    }
}

/// Check that a URL is absolute http(s).
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| RssyError::Feed(format!("invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RssyError::Feed(format!("unsupported URL scheme: {scheme}")));
        }
    }

    if parsed.host().is_none() {
        return Err(RssyError::Feed("URL has no host".to_string()));
    }
    Ok(())
}

/// Parse feed bytes into a ParsedFeed.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed =
        parser::parse(bytes).map_err(|e| RssyError::Feed(format!("failed to parse feed: {e}")))?;

    let title = feed.title.map(|t| t.content).unwrap_or_default();

    let items = feed
        .entries
        .into_iter()
        .map(|entry| ParsedItem {
            title: entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            link: entry.links.first().map(|l| l.href.clone()),
            content: entry
                .content
                .and_then(|c| c.body)
                .or(entry.summary.map(|s| s.content)),
            published: entry.published.or(entry.updated),
        })
        .collect();

    Ok(ParsedFeed { title, items })
}
