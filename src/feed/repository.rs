//! Feed and article repositories.

use sqlx::{QueryBuilder, Sqlite};

use super::types::{Article, Feed, FeedFlags, NewArticle, NewFeed, DEFAULT_PRIORITY};
use crate::db::DbPool;
use crate::{Result, RssyError};

/// Rows per multi-row INSERT.
pub const INSERT_BATCH_SIZE: usize = 10;

const FEED_COLUMNS: &str = "id, url, title, owner, priority, last_fetched_at, hide_unread, \
                            enable_readability, highlight, created_at";

const ARTICLE_COLUMNS: &str = "uid, feed_id, owner, source_name, title, link, content, read, \
                               deleted, created_at, published_at";

/// Row type for feeds.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    url: String,
    title: String,
    owner: String,
    priority: i64,
    last_fetched_at: i64,
    hide_unread: bool,
    enable_readability: bool,
    highlight: bool,
    created_at: i64,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            url: row.url,
            title: row.title,
            owner: row.owner,
            priority: row.priority,
            last_fetched_at: row.last_fetched_at,
            hide_unread: row.hide_unread,
            enable_readability: row.enable_readability,
            highlight: row.highlight,
            created_at: row.created_at,
        }
    }
}

/// Row type for articles.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    uid: String,
    feed_id: i64,
    owner: String,
    source_name: String,
    title: String,
    link: String,
    content: String,
    read: bool,
    deleted: bool,
    created_at: i64,
    published_at: i64,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            uid: row.uid,
            feed_id: row.feed_id,
            owner: row.owner,
            source_name: row.source_name,
            title: row.title,
            link: row.link,
            content: row.content,
            read: row.read,
            deleted: row.deleted,
            created_at: row.created_at,
            published_at: row.published_at,
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Look up the feed for (url, owner), creating it if missing.
    ///
    /// A created feed starts with watermark 0 and the default priority.
    pub async fn get_or_create(&self, feed: &NewFeed, now: i64) -> Result<Feed> {
        sqlx::query(
            r#"
            INSERT INTO feeds (url, title, owner, priority, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(url, owner) DO NOTHING
            "#,
        )
        .bind(&feed.url)
        .bind(&feed.title)
        .bind(&feed.owner)
        .bind(DEFAULT_PRIORITY)
        .bind(now)
        .execute(self.pool)
        .await?;

        self.get_by_url(&feed.url, &feed.owner)
            .await?
            .ok_or_else(|| RssyError::NotFound("feed".into()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL for one owner.
    pub async fn get_by_url(&self, url: &str, owner: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE url = ? AND owner = ?"
        ))
        .bind(url)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// List an owner's feeds.
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE owner = ? ORDER BY priority DESC, id"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feed::from).collect())
    }

    /// List every feed in the store.
    pub async fn list_all(&self) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY owner, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feed::from).collect())
    }

    /// Update display flags.
    pub async fn update_flags(&self, id: i64, flags: &FeedFlags) -> Result<bool> {
        if flags.is_empty() {
            return Ok(false);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE feeds SET ");
        let mut separated = query.separated(", ");

        if let Some(priority) = flags.priority {
            separated.push("priority = ");
            separated.push_bind_unseparated(priority);
        }
        if let Some(hide_unread) = flags.hide_unread {
            separated.push("hide_unread = ");
            separated.push_bind_unseparated(hide_unread);
        }
        if let Some(enable_readability) = flags.enable_readability {
            separated.push("enable_readability = ");
            separated.push_bind_unseparated(enable_readability);
        }
        if let Some(highlight) = flags.highlight {
            separated.push("highlight = ");
            separated.push_bind_unseparated(highlight);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored title.
    pub async fn update_title(&self, id: i64, title: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE feeds SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a feed and its articles.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM articles WHERE feed_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM feeds WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository for article operations.
pub struct ArticleRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Titles of all stored articles for (feed, owner).
    pub async fn titles_for_feed(&self, feed_id: i64, owner: &str) -> Result<Vec<String>> {
        let titles: Vec<String> =
            sqlx::query_scalar("SELECT title FROM articles WHERE feed_id = ? AND owner = ?")
                .bind(feed_id)
                .bind(owner)
                .fetch_all(self.pool)
                .await?;

        Ok(titles)
    }

    /// Get an article by uid.
    pub async fn get(&self, uid: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE uid = ?"
        ))
        .bind(uid)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// List a feed's articles, newest first.
    pub async fn list_by_feed(&self, feed_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE feed_id = ? \
             ORDER BY published_at DESC, uid"
        ))
        .bind(feed_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Count an owner's articles.
    pub async fn count_by_owner(&self, owner: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE owner = ?")
            .bind(owner)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Non-deleted articles published in `[start, end)`, oldest first.
    pub async fn list_published_between(
        &self,
        owner: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE owner = ? AND deleted = 0 AND published_at >= ? AND published_at < ? \
             ORDER BY published_at, uid"
        ))
        .bind(owner)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Unread, non-deleted articles published in `[start, end)` from the given feeds.
    pub async fn list_unread_in_feeds(
        &self,
        owner: &str,
        feed_ids: &[i64],
        start: i64,
        end: i64,
    ) -> Result<Vec<Article>> {
        if feed_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE owner = "
        ));
        query.push_bind(owner);
        query.push(" AND read = 0 AND deleted = 0 AND published_at >= ");
        query.push_bind(start);
        query.push(" AND published_at < ");
        query.push_bind(end);
        query.push(" AND feed_id IN (");
        let mut ids = query.separated(", ");
        for id in feed_ids {
            ids.push_bind(*id);
        }
        query.push(") ORDER BY published_at, uid");

        let rows = query
            .build_query_as::<ArticleRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Mark an owner's article as read.
    pub async fn mark_read(&self, uid: &str, owner: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE articles SET read = 1 WHERE uid = ? AND owner = ?")
            .bind(uid)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete read articles published before `cutoff`.
    pub async fn delete_read_before(&self, owner: &str, cutoff: i64) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM articles WHERE owner = ? AND read = 1 AND published_at < ?")
                .bind(owner)
                .bind(cutoff)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Delete every read article.
    pub async fn delete_read(&self, owner: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles WHERE owner = ? AND read = 1")
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Insert articles with multi-row INSERTs of [`INSERT_BATCH_SIZE`] rows.
pub(crate) async fn insert_batch(
    conn: &mut sqlx::SqliteConnection,
    articles: &[NewArticle],
    now: i64,
) -> Result<u64> {
    let mut inserted = 0;
    for chunk in articles.chunks(INSERT_BATCH_SIZE) {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO articles \
             (uid, feed_id, owner, source_name, title, link, content, created_at, published_at) ",
        );
        query.push_values(chunk, |mut row, article| {
            row.push_bind(&article.uid)
                .push_bind(article.feed_id)
                .push_bind(&article.owner)
                .push_bind(&article.source_name)
                .push_bind(&article.title)
                .push_bind(&article.link)
                .push_bind(&article.content)
                .push_bind(now)
                .push_bind(article.published_at);
        });
        inserted += query.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}
