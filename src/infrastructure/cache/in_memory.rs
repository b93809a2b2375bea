//! In-memory cache implementation using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on any entry's lifetime
    pub default_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_ttl: Duration::from_secs(3600),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache
///
/// moka enforces the capacity bound and the global TTL; per-entry TTLs are
/// checked on read.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.default_ttl)
            .build();

        Self { cache }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                self.cache.remove(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data)),
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Instant::now() + ttl,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self
            .cache
            .remove(key)
            .await
            .is_some_and(|entry| !entry.is_expired()))
    }
}
