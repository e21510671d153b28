//! Daily summary storage.

use crate::db::DbPool;
use crate::{Result, RssyError};

/// A stored daily summary.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AiSummary {
    /// Summary ID.
    pub id: i64,
    /// Owner key.
    pub owner: String,
    /// Local date, "YYYY-MM-DD".
    pub date: String,
    /// Title.
    pub title: String,
    /// Summary body.
    pub summary: String,
    /// Extracted categories, one per line.
    pub categories: String,
    /// Number of articles summarized.
    pub article_count: i64,
    /// Creation time (unix seconds).
    pub created_at: i64,
    /// Last regeneration time (unix seconds).
    pub updated_at: i64,
}

/// Summary to write.
#[derive(Debug, Clone)]
pub struct NewAiSummary {
    /// Owner key.
    pub owner: String,
    /// Local date, "YYYY-MM-DD".
    pub date: String,
    /// Title.
    pub title: String,
    /// Summary body.
    pub summary: String,
    /// Extracted categories.
    pub categories: String,
    /// Number of articles summarized.
    pub article_count: i64,
}

/// Repository for daily summaries.
pub struct SummaryRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SummaryRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the summary for (owner, date).
    ///
    /// Regenerating keeps the row's id and creation time.
    pub async fn upsert(&self, summary: &NewAiSummary, now: i64) -> Result<AiSummary> {
        sqlx::query(
            r#"
            INSERT INTO ai_summaries
                (owner, date, title, summary, categories, article_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner, date) DO UPDATE SET
                title = excluded.title,
                summary = excluded.summary,
                categories = excluded.categories,
                article_count = excluded.article_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&summary.owner)
        .bind(&summary.date)
        .bind(&summary.title)
        .bind(&summary.summary)
        .bind(&summary.categories)
        .bind(summary.article_count)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        self.get(&summary.owner, &summary.date)
            .await?
            .ok_or_else(|| RssyError::NotFound("summary".into()))
    }

    /// Get the summary for (owner, date).
    pub async fn get(&self, owner: &str, date: &str) -> Result<Option<AiSummary>> {
        let summary = sqlx::query_as::<_, AiSummary>(
            r#"
            SELECT id, owner, date, title, summary, categories, article_count,
                   created_at, updated_at
            FROM ai_summaries
            WHERE owner = ? AND date = ?
            "#,
        )
        .bind(owner)
        .bind(date)
        .fetch_optional(self.pool)
        .await?;

        Ok(summary)
    }

    /// List an owner's summaries, newest date first.
    pub async fn list_by_owner(&self, owner: &str, limit: i64) -> Result<Vec<AiSummary>> {
        let summaries = sqlx::query_as::<_, AiSummary>(
            r#"
            SELECT id, owner, date, title, summary, categories, article_count,
                   created_at, updated_at
            FROM ai_summaries
            WHERE owner = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn new_summary(date: &str, body: &str, count: i64) -> NewAiSummary {
        NewAiSummary {
            owner: "a@example.com".to_string(),
            date: date.to_string(),
            title: format!("Daily Summary - {date}"),
            summary: body.to_string(),
            categories: String::new(),
            article_count: count,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_day() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SummaryRepository::new(db.pool());

        let first = repo
            .upsert(&new_summary("2024-01-15", "first", 3), 100)
            .await
            .unwrap();
        let second = repo
            .upsert(&new_summary("2024-01-15", "second", 4), 200)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.summary, "second");
        assert_eq!(second.article_count, 4);
        assert_eq!(second.created_at, 100);
        assert_eq!(second.updated_at, 200);
        assert_eq!(
            repo.list_by_owner("a@example.com", 10).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_list_by_owner_orders_by_date() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SummaryRepository::new(db.pool());

        repo.upsert(&new_summary("2024-01-14", "a", 1), 0)
            .await
            .unwrap();
        repo.upsert(&new_summary("2024-01-15", "b", 1), 0)
            .await
            .unwrap();

        let list = repo.list_by_owner("a@example.com", 10).await.unwrap();
        assert_eq!(list[0].date, "2024-01-15");
        assert_eq!(list[1].date, "2024-01-14");
        assert!(repo.get("b@example.com", "2024-01-15").await.unwrap().is_none());
    }
}
