//! In-memory TTL cache.
//!
//! Entries are keyed by a static scope name plus a key, so one cache type can
//! hold several kinds of lookups. Writers invalidate entries synchronously; a
//! background task purges expired entries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Read-through TTL cache keyed by `(scope, key)`.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<(&'static str, K), Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a live entry.
    pub fn get(&self, scope: &'static str, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(scope, key.clone()))
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace an entry.
    pub fn insert(&self, scope: &'static str, key: K, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            (scope, key),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Remove an entry so the next read goes to the store.
    pub fn invalidate(&self, scope: &'static str, key: &K) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&(scope, key.clone()));
    }

    /// Remove all expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Spawn a task purging expired entries every `period` until cancelled.
    pub fn start_cleanup_task(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!("Purged {} expired cache entries", removed);
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: TtlCache<i64, String> = TtlCache::new(Duration::from_secs(60));
        cache.insert("feed", 1, "first".to_string());
        assert_eq!(cache.get("feed", &1), Some("first".to_string()));
        assert_eq!(cache.get("feed", &2), None);
    }

    #[test]
    fn test_scopes_are_separate() {
        let cache: TtlCache<String, i64> = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", "key".to_string(), 1);
        cache.insert("b", "key".to_string(), 2);
        assert_eq!(cache.get("a", &"key".to_string()), Some(1));
        assert_eq!(cache.get("b", &"key".to_string()), Some(2));
    }

    #[test]
    fn test_invalidate() {
        let cache: TtlCache<i64, i64> = TtlCache::new(Duration::from_secs(60));
        cache.insert("feed", 7, 70);
        cache.invalidate("feed", &7);
        assert_eq!(cache.get("feed", &7), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_hidden_and_purged() {
        let cache: TtlCache<i64, i64> = TtlCache::new(Duration::ZERO);
        cache.insert("feed", 1, 10);
        assert_eq!(cache.get("feed", &1), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_cancel() {
        let cache: Arc<TtlCache<i64, i64>> = Arc::new(TtlCache::new(Duration::ZERO));
        cache.insert("feed", 1, 10);

        let cancel = CancellationToken::new();
        let handle = cache.start_cleanup_task(Duration::from_millis(10), cancel.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }
}
