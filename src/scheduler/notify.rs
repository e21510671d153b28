//! Daily notification job.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{error, info};

use super::daily::DailyTrigger;
use super::job::Job;
use crate::notify::{DispatchOutcome, NotificationDispatcher};
use crate::preference::PreferenceService;
use crate::Result;

/// Sends each user's digest once a day at their notification time.
pub struct NotifyJob {
    prefs: PreferenceService,
    dispatcher: NotificationDispatcher,
    trigger: DailyTrigger,
    period: Duration,
}

impl NotifyJob {
    /// Create the job.
    pub fn new(
        prefs: PreferenceService,
        dispatcher: NotificationDispatcher,
        tz: Tz,
        window_minutes: u32,
        period: Duration,
    ) -> Self {
        Self {
            prefs,
            dispatcher,
            trigger: DailyTrigger::new(tz, window_minutes),
            period,
        }
    }

    /// Check every enabled user. Returns the number of dispatches attempted.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut attempted = 0;
        for pref in self.prefs.list_notification_enabled().await? {
            if !self
                .trigger
                .should_fire(&pref.owner, &pref.notification_time, now)
            {
                continue;
            }

            attempted += 1;
            match self.dispatcher.dispatch(&pref.owner, now).await {
                Ok(DispatchOutcome::Sent { articles }) => {
                    info!("Sent digest of {} articles to {}", articles, pref.owner)
                }
                Ok(_) => {}
                Err(e) => error!("Notification for {} failed: {}", pref.owner, e),
            }
        }
        Ok(attempted)
    }
}

#[async_trait]
impl Job for NotifyJob {
    fn name(&self) -> &'static str {
        "daily-notify"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&self, now: DateTime<Utc>) {
        if let Err(e) = self.run_once(now).await {
            error!("Notification tick failed: {}", e);
        }
    }
}
