//! Integration tests for daily summaries.

mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use common::{
    item, now, parsed_feed, setup, test_config, FailingCompletion, StubCompletion, StubSource,
    OWNER,
};
use rssy::preference::{PreferenceUpdate, DEFAULT_AI_SUMMARY_PROMPT};
use rssy::scheduler::SummaryJob;
use rssy::summary::SummaryRepository;
use rssy::{Completion, Daemon};

const URL: &str = "https://example.com/feed.xml";

const REPLY: &str = "Overview: two posts about tools.

Categories
- Tech: Post A
- Life: Post B

Highlights
1. Post A";

fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
}

/// Subscribe to a feed with two articles from yesterday and one from today.
async fn setup_with_articles(completion: Option<Arc<dyn Completion>>) -> Daemon {
    let source = StubSource::new();
    source.set(
        URL,
        parsed_feed(
            "Example Blog",
            vec![
                item("Post A", Duration::hours(20)),
                item("Post B", Duration::hours(30)),
                item("Today", Duration::hours(1)),
            ],
        ),
    );
    let daemon = setup(test_config(), source, completion).await;
    daemon.feeds().subscribe(URL, OWNER, now()).await.unwrap();
    daemon
}

#[tokio::test]
async fn test_summary_from_completion() {
    let completion = StubCompletion::new(REPLY);
    let daemon = setup_with_articles(Some(completion.clone() as Arc<dyn Completion>)).await;

    let summary = daemon
        .summaries()
        .generate(OWNER, yesterday(), "Summarize these")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.title, "Daily Summary - 2024-01-14");
    assert_eq!(summary.date, "2024-01-14");
    assert_eq!(summary.summary, REPLY);
    assert_eq!(summary.categories, "- Tech: Post A\n- Life: Post B");
    assert_eq!(summary.article_count, 2);

    let calls = completion.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Summarize these");
    assert!(calls[0].1.contains("1. Title: Post B"));
    assert!(calls[0].1.contains("2. Title: Post A"));
    assert!(!calls[0].1.contains("Title: Today"));
}

#[tokio::test]
async fn test_completion_failure_falls_back_to_digest() {
    let daemon = setup_with_articles(Some(Arc::new(FailingCompletion))).await;

    let summary = daemon
        .summaries()
        .generate(OWNER, yesterday(), DEFAULT_AI_SUMMARY_PROMPT)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.article_count, 2);
    assert!(summary
        .summary
        .starts_with("2 articles from 1 source.\n"));
    assert!(summary.summary.contains("## Example Blog (2)"));
    assert!(summary
        .summary
        .contains("- [Post A](https://example.com/Post-A)"));
    assert_eq!(summary.categories, "Example Blog: 2");
}

#[tokio::test]
async fn test_no_backend_uses_digest() {
    let daemon = setup_with_articles(None).await;

    let summary = daemon
        .summaries()
        .generate(OWNER, yesterday(), DEFAULT_AI_SUMMARY_PROMPT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.categories, "Example Blog: 2");
}

#[tokio::test]
async fn test_regenerating_replaces_summary() {
    let daemon = setup_with_articles(None).await;
    let generator = daemon.summaries();

    let first = generator
        .generate(OWNER, yesterday(), DEFAULT_AI_SUMMARY_PROMPT)
        .await
        .unwrap()
        .unwrap();
    let second = generator
        .generate(OWNER, yesterday(), DEFAULT_AI_SUMMARY_PROMPT)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    let all = SummaryRepository::new(daemon.db().pool())
        .list_by_owner(OWNER, 10)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_no_articles_writes_nothing() {
    let daemon = setup_with_articles(None).await;
    let empty_day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let result = daemon
        .summaries()
        .generate(OWNER, empty_day, DEFAULT_AI_SUMMARY_PROMPT)
        .await
        .unwrap();
    assert!(result.is_none());

    let stored = SummaryRepository::new(daemon.db().pool())
        .get(OWNER, "2024-01-01")
        .await
        .unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_summary_job_runs_once_per_day() {
    let completion = StubCompletion::new(REPLY);
    let daemon = setup_with_articles(Some(completion.clone() as Arc<dyn Completion>)).await;
    daemon
        .prefs()
        .update(
            OWNER,
            &PreferenceUpdate::new()
                .with_ai_summary(true, "12:00")
                .with_prompt("Custom prompt"),
        )
        .await
        .unwrap();

    let job = SummaryJob::new(
        daemon.prefs().clone(),
        daemon.summaries().clone(),
        chrono_tz::UTC,
        10,
        std::time::Duration::from_secs(60),
    );

    assert_eq!(job.run_once(now()).await.unwrap(), 1);
    assert_eq!(job.run_once(now() + Duration::minutes(1)).await.unwrap(), 0);

    let calls = completion.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Custom prompt");

    let stored = SummaryRepository::new(daemon.db().pool())
        .get(OWNER, "2024-01-14")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_summary_job_skips_outside_window() {
    let completion = StubCompletion::new(REPLY);
    let daemon = setup_with_articles(Some(completion.clone() as Arc<dyn Completion>)).await;
    daemon
        .prefs()
        .update(OWNER, &PreferenceUpdate::new().with_ai_summary(true, "09:00"))
        .await
        .unwrap();

    let job = SummaryJob::new(
        daemon.prefs().clone(),
        daemon.summaries().clone(),
        chrono_tz::UTC,
        10,
        std::time::Duration::from_secs(60),
    );

    assert_eq!(job.run_once(now()).await.unwrap(), 0);
    assert!(completion.calls.lock().unwrap().is_empty());
}
