use serde::Deserialize;

use crate::domain::messaging::RequeuePolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub queue: QueueConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment, selects the `config/{env}` overlay
    pub env: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which user store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Postgres,
    InMemory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Primary connection, used for writes
    pub primary_url: String,
    /// Read replica; reads go to the primary when unset
    pub replica_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Which cache fronts user lookups
///
/// `in_memory` is private to one process, so it is only accepted with the
/// in-memory store; a Postgres store shared by several processes needs
/// `redis` or `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Lookups go straight to the store
    #[default]
    None,
    InMemory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Required for the Redis backend
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub default_ttl_secs: u64,
    /// In-memory backend only
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    #[default]
    Redis,
    InMemory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub backend: QueueBackend,
    pub redis_url: String,
    pub queue_name: String,
    pub consumer_group: String,
    /// Consumer name within the group; defaults to the host name
    pub consumer_name: Option<String>,
    /// How long a single receive blocks waiting for a message
    pub block_timeout_ms: u64,
    pub requeue_policy: RequeuePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Six-field cron expression (seconds first)
    pub schedule: String,
    /// Users idle for longer than this are removed
    pub inactivity_threshold_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            env: "development".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            primary_url: "postgres://localhost/user_hub".to_string(),
            replica_url: None,
            max_connections: 100,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: None,
            key_prefix: None,
            default_ttl_secs: 300,
            max_capacity: 10_000,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            queue_name: "user_events".to_string(),
            consumer_group: "user-hub".to_string(),
            consumer_name: None,
            block_timeout_ms: 5_000,
            requeue_policy: RequeuePolicy::default(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            schedule: "0 0 * * * *".to_string(),
            inactivity_threshold_secs: 90 * 24 * 60 * 60,
        }
    }
}

impl AppConfig {
    /// Loads configuration for the environment named by `APP_ENV`, if any
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_for_env(std::env::var("APP_ENV").ok().as_deref())
    }

    /// Sources, later ones overriding earlier: `config/default`,
    /// `config/{env}`, `config/local`, then `APP__*` environment variables
    pub fn load_for_env(env: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
                .set_override("server.env", env)?;
        }

        let config = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
