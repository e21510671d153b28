//! Recency filter for incoming items.

use chrono::{DateTime, Duration, Utc};

/// Decide whether an item is new enough to ingest.
///
/// A feed that was never fetched (`watermark == 0`) accepts items published
/// within the last `lookback`. Otherwise only items published strictly after
/// the watermark are accepted. Items without a publish time are rejected.
pub fn is_recent(
    published: Option<DateTime<Utc>>,
    watermark: i64,
    now: DateTime<Utc>,
    lookback: Duration,
) -> bool {
    let Some(published) = published else {
        return false;
    };

    if watermark == 0 {
        published > now - lookback
    } else {
        published.timestamp() > watermark
    }
}
