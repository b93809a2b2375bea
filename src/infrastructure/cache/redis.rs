//! Redis cache implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Shared cache backed by Redis
///
/// Entries expire server-side via `SET ... EX`. TTLs are rounded down to
/// whole seconds with a floor of one.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| DomainError::cache("Timed out connecting to Redis"))?
        .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        prefixed(self.config.key_prefix.as_deref(), key)
    }
}

fn prefixed(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Option<String> = conn.get(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        Ok(result)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(&prefixed_key, value, ttl_secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let deleted: i32 = conn.del(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })?;

        Ok(exists)
    }
}
