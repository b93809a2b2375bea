//! User Hub
//!
//! A user-record service with three entry points sharing one store:
//! - HTTP API for creating, reading, updating and deleting users
//! - Queue consumer applying user events (at-least-once)
//! - Scheduled cleanup of inactive users
//!
//! Reads go through a cache-aside layer; writes go to the primary database
//! and reads to an optional replica.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use crate::config::{CacheBackend, DatabaseConfig, StoreBackend};
use domain::{DomainError, UserRepository};
use infrastructure::{
    cache::CacheFactory,
    jobs::UserCleanupJob,
    messaging::{QueueConsumer, QueueFactory, UserEventDispatcher},
    storage::{run_user_migrations, DatabasePools, PostgresConfig},
    user::{CachedUserRepository, InMemoryUserRepository, PostgresUserRepository, UserService},
};
use tracing::info;

/// Create the configured user store, running migrations for Postgres
pub async fn create_user_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn UserRepository>, DomainError> {
    info!("User store backend: {:?}", config.backend);

    match config.backend {
        StoreBackend::InMemory => Ok(Arc::new(InMemoryUserRepository::new())),
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pools = DatabasePools::connect(&PostgresConfig::from(config)).await?;
            info!(
                replica = config.replica_url.is_some(),
                "PostgreSQL connection established"
            );

            run_user_migrations(pools.primary()).await?;

            Ok(Arc::new(PostgresUserRepository::new(pools)))
        }
    }
}

/// Rejects cache backends that cannot see writes made by other processes
///
/// The `api`, `consumer` and `cron` processes share a Postgres store, so an
/// invalidation must reach every process's cache.
pub fn validate_cache_backend(config: &AppConfig) -> Result<(), DomainError> {
    if config.database.backend == StoreBackend::Postgres
        && config.cache.backend == CacheBackend::InMemory
    {
        return Err(DomainError::configuration(
            "cache.backend = in_memory cannot be used with the postgres store; \
             use a shared redis cache or none",
        ));
    }
    Ok(())
}

/// Create the user service: store, wrapped in the configured cache
pub async fn create_user_service(config: &AppConfig) -> anyhow::Result<Arc<UserService>> {
    validate_cache_backend(config)?;

    let store = create_user_repository(&config.database).await?;
    create_user_service_with_store(store, config).await
}

/// Create the user service over an existing store
pub async fn create_user_service_with_store(
    store: Arc<dyn UserRepository>,
    config: &AppConfig,
) -> anyhow::Result<Arc<UserService>> {
    info!("User cache backend: {:?}", config.cache.backend);

    let repository: Arc<dyn UserRepository> =
        match CacheFactory::new().create(&config.cache).await? {
            Some(cache) => Arc::new(CachedUserRepository::new(
                store,
                cache,
                Duration::from_secs(config.cache.default_ttl_secs),
            )),
            None => store,
        };

    Ok(Arc::new(UserService::new(repository)))
}

/// Create the application state for the HTTP API
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let user_service = create_user_service(config).await?;
    Ok(AppState::new(user_service))
}

/// Create the handler that applies user events
pub fn create_event_dispatcher(user_service: Arc<UserService>) -> UserEventDispatcher {
    UserEventDispatcher::new(user_service)
}

/// Create a consumer over the configured queue backend
pub async fn create_queue_consumer(config: &AppConfig) -> anyhow::Result<QueueConsumer> {
    let queue = QueueFactory::new().create(&config.queue).await?;
    info!("Queue backend: {:?}", config.queue.backend);

    Ok(QueueConsumer::new(queue).with_requeue_policy(config.queue.requeue_policy))
}

/// Create the inactive-user cleanup job
pub fn create_cleanup_job(config: &AppConfig, user_service: Arc<UserService>) -> Arc<UserCleanupJob> {
    Arc::new(UserCleanupJob::new(
        user_service,
        Duration::from_secs(config.cleanup.inactivity_threshold_secs),
    ))
}
