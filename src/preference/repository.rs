//! User preference repository.

use super::types::UserPreference;
use crate::db::DbPool;
use crate::{Result, RssyError};

const PREFERENCE_COLUMNS: &str = "owner, cleanup_expired_days, enable_auto_cleanup, \
                                  enable_notification, notification_time, enable_ai_summary, \
                                  ai_summary_time, ai_summary_prompt, updated_at";

/// Row type for user preferences.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PreferenceRow {
    owner: String,
    cleanup_expired_days: i64,
    enable_auto_cleanup: bool,
    enable_notification: bool,
    notification_time: String,
    enable_ai_summary: bool,
    ai_summary_time: String,
    ai_summary_prompt: String,
    updated_at: i64,
}

impl From<PreferenceRow> for UserPreference {
    fn from(row: PreferenceRow) -> Self {
        UserPreference {
            owner: row.owner,
            cleanup_expired_days: row.cleanup_expired_days,
            enable_auto_cleanup: row.enable_auto_cleanup,
            enable_notification: row.enable_notification,
            notification_time: row.notification_time,
            enable_ai_summary: row.enable_ai_summary,
            ai_summary_time: row.ai_summary_time,
            ai_summary_prompt: row.ai_summary_prompt,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for user preferences.
pub struct PreferenceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PreferenceRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get an owner's preferences.
    pub async fn get(&self, owner: &str) -> Result<Option<UserPreference>> {
        let row = sqlx::query_as::<_, PreferenceRow>(&format!(
            "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE owner = ?"
        ))
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserPreference::from))
    }

    /// Get an owner's preferences, inserting defaults if none exist.
    pub async fn get_or_create(&self, owner: &str, now: i64) -> Result<UserPreference> {
        let defaults = UserPreference::with_defaults(owner, now);
        sqlx::query(
            r#"
            INSERT INTO user_preferences (owner, cleanup_expired_days, notification_time,
                                          ai_summary_time, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(owner) DO NOTHING
            "#,
        )
        .bind(&defaults.owner)
        .bind(defaults.cleanup_expired_days)
        .bind(&defaults.notification_time)
        .bind(&defaults.ai_summary_time)
        .bind(defaults.updated_at)
        .execute(self.pool)
        .await?;

        self.get(owner)
            .await?
            .ok_or_else(|| RssyError::NotFound("user preference".into()))
    }

    /// Write every field of a preference.
    pub async fn save(&self, pref: &UserPreference) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_preferences
            SET cleanup_expired_days = ?, enable_auto_cleanup = ?, enable_notification = ?,
                notification_time = ?, enable_ai_summary = ?, ai_summary_time = ?,
                ai_summary_prompt = ?, updated_at = ?
            WHERE owner = ?
            "#,
        )
        .bind(pref.cleanup_expired_days)
        .bind(pref.enable_auto_cleanup)
        .bind(pref.enable_notification)
        .bind(&pref.notification_time)
        .bind(pref.enable_ai_summary)
        .bind(&pref.ai_summary_time)
        .bind(&pref.ai_summary_prompt)
        .bind(pref.updated_at)
        .bind(&pref.owner)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_where(&self, condition: &str) -> Result<Vec<UserPreference>> {
        let rows = sqlx::query_as::<_, PreferenceRow>(&format!(
            "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE {condition} ORDER BY owner"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(UserPreference::from).collect())
    }

    /// Preferences with daily notifications enabled.
    pub async fn list_notification_enabled(&self) -> Result<Vec<UserPreference>> {
        self.list_where("enable_notification = 1").await
    }

    /// Preferences with daily AI summaries enabled.
    pub async fn list_ai_summary_enabled(&self) -> Result<Vec<UserPreference>> {
        self.list_where("enable_ai_summary = 1").await
    }

    /// Preferences with auto-cleanup enabled.
    pub async fn list_auto_cleanup(&self) -> Result<Vec<UserPreference>> {
        self.list_where("enable_auto_cleanup = 1").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_get_or_create_inserts_defaults_once() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = PreferenceRepository::new(db.pool());

        assert!(repo.get("a@example.com").await.unwrap().is_none());
        let created = repo.get_or_create("a@example.com", 100).await.unwrap();
        assert_eq!(created, UserPreference::with_defaults("a@example.com", 100));

        let mut changed = created.clone();
        changed.enable_notification = true;
        assert!(repo.save(&changed).await.unwrap());

        // A second call does not reset the row
        let again = repo.get_or_create("a@example.com", 200).await.unwrap();
        assert!(again.enable_notification);
        assert_eq!(again.updated_at, 100);
    }

    #[tokio::test]
    async fn test_list_enabled() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = PreferenceRepository::new(db.pool());

        let mut a = repo.get_or_create("a@example.com", 0).await.unwrap();
        a.enable_notification = true;
        repo.save(&a).await.unwrap();

        let mut b = repo.get_or_create("b@example.com", 0).await.unwrap();
        b.enable_ai_summary = true;
        b.enable_auto_cleanup = true;
        repo.save(&b).await.unwrap();

        let notify = repo.list_notification_enabled().await.unwrap();
        assert_eq!(notify.len(), 1);
        assert_eq!(notify[0].owner, "a@example.com");

        let summary = repo.list_ai_summary_enabled().await.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].owner, "b@example.com");

        assert_eq!(repo.list_auto_cleanup().await.unwrap().len(), 1);
    }
}
