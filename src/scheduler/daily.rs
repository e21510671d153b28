//! Per-user daily trigger check shared by the notify and summary jobs.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use super::marker::DailyMarker;
use super::window::TriggerTime;

/// Decides whether a user's daily action fires on this tick.
#[derive(Debug)]
pub struct DailyTrigger {
    tz: Tz,
    window_minutes: u32,
    marker: DailyMarker,
}

impl DailyTrigger {
    /// Create a trigger evaluating times in `tz`.
    pub fn new(tz: Tz, window_minutes: u32) -> Self {
        Self {
            tz,
            window_minutes,
            marker: DailyMarker::new(),
        }
    }

    /// Timezone used for wall-clock comparisons.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// True if `now` falls in the window of `time` and today's marker for
    /// `owner` was unclaimed. The marker is claimed before returning.
    ///
    /// A malformed time is logged and never fires.
    pub fn should_fire(&self, owner: &str, time: &str, now: DateTime<Utc>) -> bool {
        let trigger = match TriggerTime::parse(time) {
            Ok(trigger) => trigger,
            Err(e) => {
                warn!("Skipping {}: {}", owner, e);
                return false;
            }
        };

        let local = now.with_timezone(&self.tz);
        trigger.matches(&local, self.window_minutes)
            && self.marker.try_claim(owner, local.date_naive())
    }
}
