//! Service wiring for the background daemon.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use tracing::info;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::db::Database;
use crate::feed::{Feed, FeedFetcher, FeedRefresher, FeedService, FeedSource};
use crate::notify::NotificationDispatcher;
use crate::preference::{PreferenceService, UserPreference};
use crate::scheduler::{CleanupJob, NotifyJob, RefreshJob, Scheduler, SummaryJob};
use crate::summary::{Completion, OpenAiCompletion, SummaryGenerator};
use crate::Result;

/// Long-lived services built once at startup.
pub struct Daemon {
    config: Config,
    tz: Tz,
    db: Database,
    feed_cache: Arc<TtlCache<i64, Feed>>,
    pref_cache: Arc<TtlCache<String, UserPreference>>,
    feeds: FeedService,
    prefs: PreferenceService,
    summaries: SummaryGenerator,
    dispatcher: NotificationDispatcher,
}

impl Daemon {
    /// Build services using the HTTP feed fetcher and the configured
    /// completion backend.
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let source: Arc<dyn FeedSource> = Arc::new(FeedFetcher::new(&config.feed)?);
        let completion = match OpenAiCompletion::from_config(&config.ai)? {
            Some(completion) => Some(Arc::new(completion) as Arc<dyn Completion>),
            None => {
                info!("No completion API key configured, summaries use the fallback digest");
                None
            }
        };
        Self::with_backends(config, db, source, completion)
    }

    /// Build services around explicit feed and completion backends.
    pub fn with_backends(
        config: Config,
        db: Database,
        source: Arc<dyn FeedSource>,
        completion: Option<Arc<dyn Completion>>,
    ) -> Result<Self> {
        let tz = config.scheduler.tz()?;
        let ttl = Duration::from_secs(config.scheduler.cache_ttl_secs);

        let feed_cache = Arc::new(TtlCache::new(ttl));
        let pref_cache = Arc::new(TtlCache::new(ttl));

        let refresher = Arc::new(FeedRefresher::new(
            db.clone(),
            source,
            Arc::clone(&feed_cache),
            config.feed.lookback_days,
        ));
        let feeds = FeedService::new(db.clone(), refresher, Arc::clone(&feed_cache));
        let prefs = PreferenceService::new(db.clone(), Arc::clone(&pref_cache));
        let summaries = SummaryGenerator::new(db.clone(), completion, tz, config.ai.content_cap);
        let dispatcher =
            NotificationDispatcher::new(db.clone(), feeds.clone(), &config.notify, tz)?;

        Ok(Self {
            config,
            tz,
            db,
            feed_cache,
            pref_cache,
            feeds,
            prefs,
            summaries,
            dispatcher,
        })
    }

    /// The store.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Feed service.
    pub fn feeds(&self) -> &FeedService {
        &self.feeds
    }

    /// Preference service.
    pub fn prefs(&self) -> &PreferenceService {
        &self.prefs
    }

    /// Summary generator.
    pub fn summaries(&self) -> &SummaryGenerator {
        &self.summaries
    }

    /// Notification dispatcher.
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Start every job and the cache purge tasks.
    pub fn start(&self) -> Scheduler {
        let sched = &self.config.scheduler;
        let daily_period = Duration::from_secs(sched.daily_tick_secs);
        let purge_period = Duration::from_secs(sched.cache_ttl_secs);

        let mut scheduler = Scheduler::new();
        let token = scheduler.token();
        scheduler.track(self.feed_cache.start_cleanup_task(purge_period, token.clone()));
        scheduler.track(self.pref_cache.start_cleanup_task(purge_period, token));

        scheduler.spawn(Arc::new(RefreshJob::new(
            self.db.clone(),
            Arc::clone(self.feeds.refresher()),
            sched,
        )));
        scheduler.spawn(Arc::new(NotifyJob::new(
            self.prefs.clone(),
            self.dispatcher.clone(),
            self.tz,
            sched.trigger_window_minutes,
            daily_period,
        )));
        scheduler.spawn(Arc::new(SummaryJob::new(
            self.prefs.clone(),
            self.summaries.clone(),
            self.tz,
            sched.trigger_window_minutes,
            daily_period,
        )));
        scheduler.spawn(Arc::new(CleanupJob::new(
            self.prefs.clone(),
            self.feeds.clone(),
            Duration::from_secs(sched.cleanup_interval_secs),
        )));

        info!(
            "Scheduler started with {} background tasks (timezone {})",
            scheduler.len(),
            self.tz
        );
        scheduler
    }
}
