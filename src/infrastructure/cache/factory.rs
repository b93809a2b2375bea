//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, CacheConfig};
use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Builds the configured cache backend
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// `None` when caching is disabled
    pub async fn create(
        &self,
        config: &CacheConfig,
    ) -> Result<Option<Arc<dyn Cache>>, DomainError> {
        match config.backend {
            CacheBackend::None => Ok(None),
            CacheBackend::InMemory => {
                let in_memory_config = InMemoryCacheConfig::default()
                    .with_max_capacity(config.max_capacity)
                    .with_default_ttl(Duration::from_secs(config.default_ttl_secs.max(1)));

                Ok(Some(Arc::new(InMemoryCache::with_config(in_memory_config))))
            }
            CacheBackend::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("cache.redis_url is required for the Redis cache")
                })?;

                let mut redis_config = RedisCacheConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let cache = RedisCache::new(redis_config).await?;
                Ok(Some(Arc::new(cache)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_factory_default_is_disabled() {
        let factory = CacheFactory::new();
        assert!(factory.create(&CacheConfig::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let factory = CacheFactory::new();
        let config = CacheConfig {
            backend: CacheBackend::InMemory,
            ..Default::default()
        };
        let cache = factory.create(&config).await.unwrap().unwrap();

        cache
            .set("user:u1", &"Ann", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("user:u1").await.unwrap();
        assert_eq!(result, Some("Ann".to_string()));
    }

    #[tokio::test]
    async fn test_factory_create_redis_missing_url() {
        let factory = CacheFactory::new();
        let config = CacheConfig {
            backend: CacheBackend::Redis,
            redis_url: None,
            ..Default::default()
        };

        let result = factory.create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
