//! Best-effort paste cache.
//!
//! None of the operations here can fail from the caller's point of view: a
//! cache that is broken behaves exactly like one that is empty, and reads
//! fall through to the database.

use std::time::Duration;

use crate::config;
use crate::models::Paste;

pub mod memory;

pub trait Cache {
    /// Get a paste by id. Any failure is reported as a miss.
    async fn get(&self, id: &str) -> Option<Paste>;

    /// Store a paste under its id, replacing any previous entry.
    async fn set(&self, paste: &Paste);

    /// Drop the entry for an id, if there is one.
    async fn delete(&self, id: &str);
}

#[derive(Clone)]
pub enum AnyCache {
    Memory(memory::MemoryCache),
    Disabled,
}

impl AnyCache {
    pub fn from_config(config: &config::Cache) -> Self {
        match config.kind {
            config::CacheKind::Memory => memory::MemoryCache::new(
                config.capacity,
                Duration::from_secs(config.ttl_secs),
            )
            .into(),
            config::CacheKind::None => AnyCache::Disabled,
        }
    }
}

impl Cache for AnyCache {
    async fn get(&self, id: &str) -> Option<Paste> {
        match self {
            AnyCache::Memory(memory) => memory.get(id).await,
            AnyCache::Disabled => None,
        }
    }

    async fn set(&self, paste: &Paste) {
        match self {
            AnyCache::Memory(memory) => memory.set(paste).await,
            AnyCache::Disabled => {}
        }
    }

    async fn delete(&self, id: &str) {
        match self {
            AnyCache::Memory(memory) => memory.delete(id).await,
            AnyCache::Disabled => {}
        }
    }
}

impl From<memory::MemoryCache> for AnyCache {
    fn from(value: memory::MemoryCache) -> Self {
        AnyCache::Memory(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_paste;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = AnyCache::from_config(&config::Cache {
            kind: config::CacheKind::None,
            ..Default::default()
        });
        let paste = sample_paste("abcd1234", "alice@example.com");

        cache.set(&paste).await;
        assert_eq!(cache.get("abcd1234").await, None);
        cache.delete("abcd1234").await;
    }

    #[tokio::test]
    async fn memory_cache_from_config() {
        let cache = AnyCache::from_config(&config::Cache::default());
        assert!(matches!(cache, AnyCache::Memory(_)));

        let paste = sample_paste("abcd1234", "alice@example.com");
        cache.set(&paste).await;
        assert_eq!(cache.get("abcd1234").await, Some(paste));
    }
}
