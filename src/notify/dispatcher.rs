//! Daily digest notification.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::NotifyConfig;
use crate::datetime::{day_bounds, yesterday};
use crate::db::Database;
use crate::feed::{Article, ArticleRepository, FeedService};
use crate::{Result, RssyError};

/// Webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestMessage {
    /// Message title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Short description.
    pub description: String,
}

impl DigestMessage {
    /// Build the digest for an owner's articles from `date`.
    pub fn new(owner: &str, date: NaiveDate, articles: &[Article]) -> Self {
        let mut content = format!(
            "Unread highlighted articles from yesterday ({}):\n\n",
            date.format("%Y-%m-%d")
        );
        for article in articles {
            content.push_str(&format!("- [{}]({})\n", article.title, article.link));
        }

        Self {
            title: format!("Daily RSS digest - {owner}"),
            content,
            description: match articles.len() {
                1 => "1 article".to_string(),
                n => format!("{n} articles"),
            },
        }
    }
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The webhook accepted the digest.
    Sent {
        /// Articles included.
        articles: usize,
    },
    /// Nothing to send.
    NoContent,
    /// No webhook configured.
    Disabled,
}

/// Pushes daily digests to a webhook.
#[derive(Clone)]
pub struct NotificationDispatcher {
    db: Database,
    feeds: FeedService,
    client: reqwest::Client,
    webhook_url: Option<String>,
    tz: Tz,
}

impl NotificationDispatcher {
    /// Create a dispatcher from the notify configuration.
    pub fn new(db: Database, feeds: FeedService, config: &NotifyConfig, tz: Tz) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RssyError::Notify(format!("failed to create HTTP client: {e}")))?;

        let webhook_url = Some(config.webhook_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(Self {
            db,
            feeds,
            client,
            webhook_url,
            tz,
        })
    }

    /// Unread articles from highlighted feeds published on `date`.
    pub async fn collect(&self, owner: &str, date: NaiveDate) -> Result<Vec<Article>> {
        let mut highlighted = Vec::new();
        for feed in self.feeds.list_feeds(owner).await? {
            if self.feeds.feed_meta(feed.id).await?.highlight {
                highlighted.push(feed.id);
            }
        }
        if highlighted.is_empty() {
            debug!("{} has no highlighted feeds", owner);
            return Ok(Vec::new());
        }

        let (start, end) = day_bounds(date, self.tz);
        ArticleRepository::new(self.db.pool())
            .list_unread_in_feeds(owner, &highlighted, start, end)
            .await
    }

    /// Send yesterday's digest for an owner.
    pub async fn dispatch(&self, owner: &str, now: DateTime<Utc>) -> Result<DispatchOutcome> {
        let Some(url) = &self.webhook_url else {
            info!("No notification webhook configured, skipping {}", owner);
            return Ok(DispatchOutcome::Disabled);
        };

        let date = yesterday(now, self.tz);
        let articles = self.collect(owner, date).await?;
        if articles.is_empty() {
            info!("No unread highlighted articles for {} on {}", owner, date);
            return Ok(DispatchOutcome::NoContent);
        }

        let message = DigestMessage::new(owner, date, &articles);
        let response = self
            .client
            .post(url)
            .json(&message)
            .send()
            .await
            .map_err(|e| RssyError::Notify(format!("webhook request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Notification result for {}: {} {}", owner, status, body);

        if !status.is_success() {
            return Err(RssyError::Notify(format!("webhook returned {status}")));
        }
        Ok(DispatchOutcome::Sent {
            articles: articles.len(),
        })
    }
}
