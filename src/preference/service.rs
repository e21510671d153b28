//! Preference service with a read-through cache.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::repository::PreferenceRepository;
use super::types::{PreferenceUpdate, UserPreference};
use crate::cache::TtlCache;
use crate::db::Database;
use crate::scheduler::TriggerTime;
use crate::{Result, RssyError};

const PREFERENCE_SCOPE: &str = "preference";

/// Service for user preferences.
#[derive(Clone)]
pub struct PreferenceService {
    db: Database,
    cache: Arc<TtlCache<String, UserPreference>>,
}

impl PreferenceService {
    /// Create a new service.
    pub fn new(db: Database, cache: Arc<TtlCache<String, UserPreference>>) -> Self {
        Self { db, cache }
    }

    /// Get an owner's preferences, creating defaults on first access.
    pub async fn get(&self, owner: &str) -> Result<UserPreference> {
        let key = owner.to_string();
        if let Some(pref) = self.cache.get(PREFERENCE_SCOPE, &key) {
            return Ok(pref);
        }

        let pref = PreferenceRepository::new(self.db.pool())
            .get_or_create(owner, Utc::now().timestamp())
            .await?;
        self.cache.insert(PREFERENCE_SCOPE, key, pref.clone());
        Ok(pref)
    }

    /// Apply an update and drop the cached entry.
    ///
    /// Trigger times are validated before anything is written.
    pub async fn update(&self, owner: &str, update: &PreferenceUpdate) -> Result<UserPreference> {
        for time in [&update.notification_time, &update.ai_summary_time]
            .into_iter()
            .flatten()
        {
            TriggerTime::parse(time).map_err(|e| RssyError::Validation(e.to_string()))?;
        }

        let repo = PreferenceRepository::new(self.db.pool());
        let now = Utc::now().timestamp();
        let mut pref = repo.get_or_create(owner, now).await?;
        update.apply(&mut pref);
        pref.updated_at = now;
        repo.save(&pref).await?;

        self.cache.invalidate(PREFERENCE_SCOPE, &owner.to_string());
        debug!("Updated preferences for {}", owner);
        Ok(pref)
    }

    /// Preferences with daily notifications enabled.
    pub async fn list_notification_enabled(&self) -> Result<Vec<UserPreference>> {
        PreferenceRepository::new(self.db.pool())
            .list_notification_enabled()
            .await
    }

    /// Preferences with daily AI summaries enabled.
    pub async fn list_ai_summary_enabled(&self) -> Result<Vec<UserPreference>> {
        PreferenceRepository::new(self.db.pool())
            .list_ai_summary_enabled()
            .await
    }

    /// Preferences with auto-cleanup enabled.
    pub async fn list_auto_cleanup(&self) -> Result<Vec<UserPreference>> {
        PreferenceRepository::new(self.db.pool())
            .list_auto_cleanup()
            .await
    }
}
