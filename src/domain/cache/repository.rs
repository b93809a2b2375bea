//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Key/value cache with per-entry expiry
///
/// Values travel as JSON strings so the trait stays dyn-compatible; use
/// [`CacheExt`] for typed access. Nothing ties cache contents to the store,
/// so entries may be stale.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value in the cache with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value from the cache, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if a key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}


#[cfg(test)]
mod tests {
    use super::mock::MockCache;
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let cache = MockCache::new();
        let profile = Profile {
            name: "Ann".to_string(),
            visits: 3,
        };

        cache
            .set("profile:1", &profile, Duration::from_secs(30))
            .await
            .unwrap();

        let cached: Option<Profile> = cache.get("profile:1").await.unwrap();
        assert_eq!(cached, Some(profile));
        assert_eq!(cache.ttl_of("profile:1"), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_typed_get_rejects_garbage() {
        let cache = MockCache::new();
        cache
            .set_raw("profile:1", "not json", Duration::from_secs(30))
            .await
            .unwrap();

        let result: Result<Option<Profile>, _> = cache.get("profile:1").await;
        assert!(matches!(result, Err(DomainError::Cache { .. })));
    }

    #[tokio::test]
    async fn test_exists_default_method() {
        let cache = MockCache::new();
        assert!(!cache.exists("missing").await.unwrap());

        cache
            .set_raw("present", "1", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(cache.exists("present").await.unwrap());
    }
}
