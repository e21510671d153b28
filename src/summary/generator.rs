//! Daily summary generation.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use super::completion::Completion;
use super::prompt::{extract_categories, fallback_digest, format_articles};
use super::repository::{AiSummary, NewAiSummary, SummaryRepository};
use crate::datetime::day_bounds;
use crate::db::Database;
use crate::feed::{Article, ArticleRepository};
use crate::Result;

/// Title used for a day's summary.
pub fn summary_title(date: NaiveDate) -> String {
    format!("Daily Summary - {}", date.format("%Y-%m-%d"))
}

/// Builds and stores daily summaries.
#[derive(Clone)]
pub struct SummaryGenerator {
    db: Database,
    completion: Option<Arc<dyn Completion>>,
    tz: Tz,
    content_cap: usize,
}

impl SummaryGenerator {
    /// Create a generator. Without a completion backend every summary uses
    /// the fallback digest.
    pub fn new(
        db: Database,
        completion: Option<Arc<dyn Completion>>,
        tz: Tz,
        content_cap: usize,
    ) -> Self {
        Self {
            db,
            completion,
            tz,
            content_cap,
        }
    }

    /// Summarize an owner's articles published on `date` (local).
    ///
    /// Returns `None` without writing anything when there are no articles.
    pub async fn generate(
        &self,
        owner: &str,
        date: NaiveDate,
        prompt: &str,
    ) -> Result<Option<AiSummary>> {
        let (start, end) = day_bounds(date, self.tz);
        let articles = ArticleRepository::new(self.db.pool())
            .list_published_between(owner, start, end)
            .await?;

        if articles.is_empty() {
            info!("No articles to summarize for {} on {}", owner, date);
            return Ok(None);
        }

        let (summary, categories) = match self.complete(prompt, &articles).await {
            Some(summary) => {
                let categories = extract_categories(&summary);
                (summary, categories)
            }
            None => {
                let digest = fallback_digest(&articles);
                (digest.summary, digest.categories)
            }
        };

        let stored = SummaryRepository::new(self.db.pool())
            .upsert(
                &NewAiSummary {
                    owner: owner.to_string(),
                    date: date.format("%Y-%m-%d").to_string(),
                    title: summary_title(date),
                    summary,
                    categories,
                    article_count: articles.len() as i64,
                },
                Utc::now().timestamp(),
            )
            .await?;

        info!(
            "Stored summary for {} on {} ({} articles)",
            owner, stored.date, stored.article_count
        );
        Ok(Some(stored))
    }

    async fn complete(&self, prompt: &str, articles: &[Article]) -> Option<String> {
        let Some(completion) = &self.completion else {
            info!("No completion backend configured, using fallback digest");
            return None;
        };

        let text = format_articles(articles, self.content_cap);
        match completion.complete(prompt, &text).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Completion failed, using fallback digest: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_title() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(summary_title(date), "Daily Summary - 2024-03-05");
    }
}
