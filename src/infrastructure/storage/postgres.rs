//! PostgreSQL connection pools

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// PostgreSQL pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Primary database URL, used for writes
    pub url: String,
    /// Replica database URL, used for reads
    pub replica_url: Option<String>,
    /// Maximum number of connections in each pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/user_hub".to_string(),
            replica_url: None,
            max_connections: 100,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_replica(mut self, url: impl Into<String>) -> Self {
        self.replica_url = Some(url.into());
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

impl From<&DatabaseConfig> for PostgresConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.primary_url.clone(),
            replica_url: config.replica_url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

/// Primary and read-replica pools
///
/// Without a replica both handles point at the same pool.
#[derive(Debug, Clone)]
pub struct DatabasePools {
    primary: PgPool,
    replica: PgPool,
}

impl DatabasePools {
    pub fn new(primary: PgPool, replica: PgPool) -> Self {
        Self { primary, replica }
    }

    /// Use a single pool for reads and writes
    pub fn single(pool: PgPool) -> Self {
        Self {
            replica: pool.clone(),
            primary: pool,
        }
    }

    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let primary = connect_pool(config, &config.url).await?;

        match &config.replica_url {
            Some(url) => {
                let replica = connect_pool(config, url).await?;
                info!("Connected to PostgreSQL primary and replica");
                Ok(Self::new(primary, replica))
            }
            None => {
                info!("Connected to PostgreSQL primary, no replica configured");
                Ok(Self::single(primary))
            }
        }
    }

    /// Pool for writes
    pub fn primary(&self) -> &PgPool {
        &self.primary
    }

    /// Pool for reads
    pub fn replica(&self) -> &PgPool {
        &self.replica
    }

    pub async fn close(&self) {
        self.replica.close().await;
        self.primary.close().await;
    }
}

async fn connect_pool(config: &PostgresConfig, url: &str) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| DomainError::store_unavailable(format!("Failed to connect to PostgreSQL: {}", e)))
}
