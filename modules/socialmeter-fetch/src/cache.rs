//! Advisory avatar cache keyed by handle.
//!
//! Never the sole source of truth: concurrent invocations may race on it and
//! the worst case is a duplicate identical network fetch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const MAX_CACHE_ENTRIES: usize = 500;

#[async_trait]
pub trait AvatarCache: Send + Sync {
    async fn get(&self, handle: &str) -> Option<String>;
    async fn set(&self, handle: &str, avatar_url: String);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    avatar_url: String,
    inserted_at: Instant,
}

pub struct InMemoryAvatarCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryAvatarCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAvatarCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarCache for InMemoryAvatarCache {
    async fn get(&self, handle: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(handle)?;
        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.avatar_url.clone())
        } else {
            None
        }
    }

    async fn set(&self, handle: &str, avatar_url: String) {
        let mut entries = self.entries.write().await;
        // Opportunistic eviction when we hit the limit
        if entries.len() >= MAX_CACHE_ENTRIES {
            let now = Instant::now();
            entries.retain(|_, v| now.duration_since(v.inserted_at) < self.ttl);
        }
        entries.insert(
            handle.to_string(),
            CacheEntry {
                avatar_url,
                inserted_at: Instant::now(),
            },
        );
    }
}

/// Cache that remembers nothing. Useful where staleness is unacceptable.
pub struct NoopAvatarCache;

#[async_trait]
impl AvatarCache for NoopAvatarCache {
    async fn get(&self, _handle: &str) -> Option<String> {
        None
    }

    async fn set(&self, _handle: &str, _avatar_url: String) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_returns_within_ttl() {
        let cache = InMemoryAvatarCache::new();
        cache.set("nasa", "https://cdn.example/nasa.jpg".to_string()).await;
        assert_eq!(
            cache.get("nasa").await.as_deref(),
            Some("https://cdn.example/nasa.jpg")
        );
        assert_eq!(cache.get("esa").await, None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let cache = InMemoryAvatarCache::with_ttl(Duration::ZERO);
        cache.set("nasa", "https://cdn.example/nasa.jpg".to_string()).await;
        assert_eq!(cache.get("nasa").await, None);
    }

    #[tokio::test]
    async fn noop_cache_remembers_nothing() {
        let cache = NoopAvatarCache;
        cache.set("nasa", "https://cdn.example/nasa.jpg".to_string()).await;
        assert_eq!(cache.get("nasa").await, None);
    }
}
