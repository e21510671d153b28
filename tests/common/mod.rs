//! Test helpers for integration tests.
//!
//! Provides stub feed and completion backends, a webhook receiver and
//! helpers for building services on an in-memory database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Duration, TimeZone, Utc};

use rssy::feed::{ParsedFeed, ParsedItem};
use rssy::summary::Completion;
use rssy::{Config, Daemon, Database, FeedSource, Result, RssyError};

/// Owner used throughout the tests.
pub const OWNER: &str = "reader@example.com";

/// Fixed "now" for deterministic tests: 2024-01-15 12:00:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

/// An item published `age` before [`now`].
pub fn item(title: &str, age: Duration) -> ParsedItem {
    ParsedItem::new(title)
        .with_link(format!("https://example.com/{}", title.replace(' ', "-")))
        .with_content(format!("<p>{title} body</p>"))
        .with_published(now() - age)
}

/// A feed document with the given items.
pub fn parsed_feed(title: &str, items: Vec<ParsedItem>) -> ParsedFeed {
    ParsedFeed {
        title: title.to_string(),
        items,
    }
}

/// Feed source serving canned documents.
#[derive(Default)]
pub struct StubSource {
    feeds: Mutex<HashMap<String, std::result::Result<ParsedFeed, String>>>,
    fetches: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `feed` at `url`.
    pub fn set(&self, url: &str, feed: ParsedFeed) {
        self.feeds.lock().unwrap().insert(url.to_string(), Ok(feed));
    }

    /// Fail every fetch of `url`.
    pub fn fail(&self, url: &str) {
        self.feeds
            .lock()
            .unwrap()
            .insert(url.to_string(), Err("connection refused".to_string()));
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StubSource {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.feeds.lock().unwrap().get(url) {
            Some(Ok(feed)) => Ok(feed.clone()),
            Some(Err(e)) => Err(RssyError::Feed(e.clone())),
            None => Err(RssyError::Feed(format!("no such feed: {url}"))),
        }
    }
}

/// Completion backend returning a fixed reply and recording prompts.
pub struct StubCompletion {
    reply: String,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubCompletion {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Completion for StubCompletion {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        Ok(self.reply.clone())
    }
}

/// Completion backend that always fails.
pub struct FailingCompletion;

#[async_trait]
impl Completion for FailingCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(RssyError::Completion("upstream returned 503".to_string()))
    }
}

/// Configuration suitable for tests: UTC, no webhook, no API key.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.scheduler.timezone = "UTC".to_string();
    config.ai.api_key = String::new();
    config.notify.webhook_url = String::new();
    config
}

/// Build a daemon on a fresh in-memory database.
pub async fn setup(
    config: Config,
    source: Arc<StubSource>,
    completion: Option<Arc<dyn Completion>>,
) -> Daemon {
    let db = Database::open_in_memory().await.unwrap();
    Daemon::with_backends(config, db, source, completion).unwrap()
}

/// Payloads received by a [`start_webhook`] server.
pub type Received = Arc<Mutex<Vec<serde_json::Value>>>;

async fn receive(
    State((received, status)): State<(Received, StatusCode)>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, &'static str) {
    received.lock().unwrap().push(body);
    (status, "{\"code\":0}")
}

/// Start a webhook receiver answering with `status`. Returns its URL.
pub async fn start_webhook(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state((Arc::clone(&received), status));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/hook"), received)
}
