//! Daily AI summary job.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::error;

use super::daily::DailyTrigger;
use super::job::Job;
use crate::datetime::yesterday;
use crate::preference::PreferenceService;
use crate::summary::SummaryGenerator;
use crate::Result;

/// Summarizes each user's previous day at their summary time.
pub struct SummaryJob {
    prefs: PreferenceService,
    generator: SummaryGenerator,
    trigger: DailyTrigger,
    period: Duration,
}

impl SummaryJob {
    /// Create the job.
    pub fn new(
        prefs: PreferenceService,
        generator: SummaryGenerator,
        tz: Tz,
        window_minutes: u32,
        period: Duration,
    ) -> Self {
        Self {
            prefs,
            generator,
            trigger: DailyTrigger::new(tz, window_minutes),
            period,
        }
    }

    /// Check every enabled user. Returns the number of summaries stored.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let date = yesterday(now, self.trigger.tz());
        let mut stored = 0;

        for pref in self.prefs.list_ai_summary_enabled().await? {
            if !self
                .trigger
                .should_fire(&pref.owner, &pref.ai_summary_time, now)
            {
                continue;
            }

            match self
                .generator
                .generate(&pref.owner, date, pref.effective_prompt())
                .await
            {
                Ok(Some(_)) => stored += 1,
                Ok(None) => {}
                Err(e) => error!("Summary for {} on {} failed: {}", pref.owner, date, e),
            }
        }
        Ok(stored)
    }
}

#[async_trait]
impl Job for SummaryJob {
    fn name(&self) -> &'static str {
        "ai-summary"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn tick(&self, now: DateTime<Utc>) {
        if let Err(e) = self.run_once(now).await {
            error!("Summary tick failed: {}", e);
        }
    }
}
