//! Once-per-day run markers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

/// Remembers the last local date a daily job ran for each user.
#[derive(Debug, Default)]
pub struct DailyMarker {
    last_run: Mutex<HashMap<String, NaiveDate>>,
}

impl DailyMarker {
    /// Create an empty marker set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `date` for `owner`. Returns false if it was already claimed.
    pub fn try_claim(&self, owner: &str, date: NaiveDate) -> bool {
        let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        if last_run.get(owner) == Some(&date) {
            return false;
        }
        last_run.insert(owner.to_string(), date);
        true
    }
}
