//! rssy - RSS aggregation daemon
//!
//! Periodically ingests subscribed feeds into SQLite, then runs per-user
//! daily jobs: webhook digests, AI summaries and cleanup of read articles.

pub mod cache;
pub mod config;
pub mod daemon;
pub mod datetime;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod notify;
pub mod preference;
pub mod scheduler;
pub mod summary;

pub use cache::TtlCache;
pub use config::Config;
pub use daemon::Daemon;
pub use db::Database;
pub use error::{Result, RssyError};
pub use feed::{FeedService, FeedSource};
pub use notify::NotificationDispatcher;
pub use preference::PreferenceService;
pub use scheduler::Scheduler;
pub use summary::{Completion, SummaryGenerator};
