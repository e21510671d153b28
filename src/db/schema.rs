//! Database schema and migrations for rssy.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: feeds and articles
    r#"
CREATE TABLE feeds (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    url                 TEXT NOT NULL,
    title               TEXT NOT NULL DEFAULT '',
    owner               TEXT NOT NULL,
    priority            INTEGER NOT NULL DEFAULT 1,
    last_fetched_at     INTEGER NOT NULL DEFAULT 0,  -- watermark, 0 = never fetched
    hide_unread         INTEGER NOT NULL DEFAULT 0,
    enable_readability  INTEGER NOT NULL DEFAULT 0,
    highlight           INTEGER NOT NULL DEFAULT 0,
    created_at          INTEGER NOT NULL,
    UNIQUE(url, owner)
);

CREATE INDEX idx_feeds_owner ON feeds(owner);

CREATE TABLE articles (
    uid           TEXT PRIMARY KEY,
    feed_id       INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    owner         TEXT NOT NULL,
    source_name   TEXT NOT NULL DEFAULT '',
    title         TEXT NOT NULL,
    link          TEXT NOT NULL DEFAULT '',
    content       TEXT NOT NULL DEFAULT '',
    read          INTEGER NOT NULL DEFAULT 0,
    deleted       INTEGER NOT NULL DEFAULT 0,
    created_at    INTEGER NOT NULL,
    published_at  INTEGER NOT NULL
);

-- Title lookups for deduplication
CREATE INDEX idx_articles_feed_owner ON articles(feed_id, owner);
CREATE INDEX idx_articles_owner_published ON articles(owner, published_at);
"#,
    // v2: per-user preferences
    r#"
CREATE TABLE user_preferences (
    owner                 TEXT PRIMARY KEY,
    cleanup_expired_days  INTEGER NOT NULL DEFAULT 30,
    enable_auto_cleanup   INTEGER NOT NULL DEFAULT 0,
    enable_notification   INTEGER NOT NULL DEFAULT 0,
    notification_time     TEXT NOT NULL DEFAULT '08:00',
    enable_ai_summary     INTEGER NOT NULL DEFAULT 0,
    ai_summary_time       TEXT NOT NULL DEFAULT '09:00',
    ai_summary_prompt     TEXT NOT NULL DEFAULT '',
    updated_at            INTEGER NOT NULL
);
"#,
    // v3: daily AI summaries
    r#"
CREATE TABLE ai_summaries (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    owner          TEXT NOT NULL,
    date           TEXT NOT NULL,  -- YYYY-MM-DD in the configured timezone
    title          TEXT NOT NULL,
    summary        TEXT NOT NULL,
    categories     TEXT NOT NULL DEFAULT '',
    article_count  INTEGER NOT NULL DEFAULT 0,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL,
    UNIQUE(owner, date)
);
"#,
];
