//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheBackend, CacheConfig, CleanupConfig, DatabaseConfig, LogFormat,
    LoggingConfig, QueueBackend, QueueConfig, ServerConfig, StoreBackend,
};
