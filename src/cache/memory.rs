use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, warn};

use super::Cache;
use crate::models::Paste;

struct Entry {
    json: String,
    inserted: Instant,
}

/// In-process LRU cache holding pastes as serialized JSON.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<LruCache<String, Entry>>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        MemoryCache {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, LruCache<String, Entry>>> {
        match self.entries.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("paste cache lock poisoned, bypassing cache");
                None
            }
        }
    }

    /// Take the raw entry for an id, dropping it if it has expired.
    pub(crate) fn get_json(&self, id: &str) -> Option<String> {
        let mut entries = self.lock()?;
        let expired = entries.get(id)?.inserted.elapsed() >= self.ttl;
        if expired {
            entries.pop(id);
            return None;
        }
        entries.get(id).map(|entry| entry.json.clone())
    }

    pub(crate) fn put_json(&self, id: &str, json: String) {
        if let Some(mut entries) = self.lock() {
            let entry = Entry {
                json,
                inserted: Instant::now(),
            };
            entries.put(id.to_owned(), entry);
        }
    }
}

#[cfg(test)]
impl MemoryCache {
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Cache for MemoryCache {
    async fn get(&self, id: &str) -> Option<Paste> {
        let json = self.get_json(id)?;
        match serde_json::from_str(&json) {
            Ok(paste) => Some(paste),
            Err(err) => {
                debug!("discarding undecodable cache entry for '{id}': {err}");
                None
            }
        }
    }

    async fn set(&self, paste: &Paste) {
        match serde_json::to_string(paste) {
            Ok(json) => self.put_json(&paste.id, json),
            Err(err) => debug!("not caching paste '{}': {err}", paste.id),
        }
    }

    async fn delete(&self, id: &str) {
        if let Some(mut entries) = self.lock() {
            entries.pop(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_paste;

    fn cache() -> MemoryCache {
        MemoryCache::new(16, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn set_get_delete() {
        let cache = cache();
        let paste = sample_paste("abcd1234", "alice@example.com");

        assert_eq!(cache.get("abcd1234").await, None);
        cache.set(&paste).await;
        assert_eq!(cache.get("abcd1234").await, Some(paste));
        cache.delete("abcd1234").await;
        assert_eq!(cache.get("abcd1234").await, None);
    }

    #[tokio::test]
    async fn entries_are_stored_as_json() {
        let cache = cache();
        cache
            .set(&sample_paste("abcd1234", "alice@example.com"))
            .await;

        let json = cache.get_json("abcd1234").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ownerIdentity"], "alice@example.com");
        assert!(value.get("isOwner").is_none());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let cache = cache();
        cache.put_json("abcd1234", "{\"id\": 42".to_owned());
        assert_eq!(cache.get("abcd1234").await, None);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new(16, Duration::ZERO);
        cache
            .set(&sample_paste("abcd1234", "alice@example.com"))
            .await;
        assert_eq!(cache.get("abcd1234").await, None);
        assert!(cache.get_json("abcd1234").is_none());
    }

    #[tokio::test]
    async fn least_recently_used_is_evicted() {
        let cache = MemoryCache::new(2, Duration::from_secs(60));
        let first = sample_paste("first111", "alice@example.com");
        let second = sample_paste("second22", "alice@example.com");
        let third = sample_paste("third333", "alice@example.com");

        cache.set(&first).await;
        cache.set(&second).await;
        // touch the first entry so the second is the oldest
        assert!(cache.get("first111").await.is_some());
        cache.set(&third).await;

        assert_eq!(cache.get("first111").await, Some(first));
        assert_eq!(cache.get("second22").await, None);
        assert_eq!(cache.get("third333").await, Some(third));
    }

    #[tokio::test]
    async fn zero_capacity_still_caches_one_entry() {
        let cache = MemoryCache::new(0, Duration::from_secs(60));
        let paste = sample_paste("abcd1234", "alice@example.com");
        cache.set(&paste).await;
        assert_eq!(cache.get("abcd1234").await, Some(paste));
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = cache();
        let clone = cache.clone();
        let paste = sample_paste("abcd1234", "alice@example.com");

        clone.set(&paste).await;
        assert_eq!(cache.get("abcd1234").await, Some(paste));
    }
}
