//! Queue factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use crate::config::{QueueBackend, QueueConfig};
use crate::domain::messaging::MessageQueue;
use crate::domain::DomainError;

use super::in_memory::InMemoryQueue;
use super::redis_stream::{RedisStreamConfig, RedisStreamQueue};

/// Builds the configured queue backend
#[derive(Debug, Default)]
pub struct QueueFactory;

impl QueueFactory {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(&self, config: &QueueConfig) -> Result<Arc<dyn MessageQueue>, DomainError> {
        match config.backend {
            QueueBackend::InMemory => Ok(Arc::new(InMemoryQueue::new())),
            QueueBackend::Redis => {
                let stream_config = RedisStreamConfig::new(
                    config.redis_url.clone(),
                    config.consumer_group.clone(),
                    consumer_name(config),
                )
                .with_block_timeout(Duration::from_millis(config.block_timeout_ms));

                let queue = RedisStreamQueue::connect(stream_config).await?;
                Ok(Arc::new(queue))
            }
        }
    }
}

/// Configured name, else the host name, so a restarted consumer picks up
/// its own pending entries
fn consumer_name(config: &QueueConfig) -> String {
    config
        .consumer_name
        .clone()
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "user-hub".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let config = QueueConfig {
            backend: QueueBackend::InMemory,
            ..Default::default()
        };

        let queue = QueueFactory::new().create(&config).await.unwrap();
        queue.declare(&config.queue_name).await.unwrap();
        queue.close().await.unwrap();
    }

    #[test]
    fn test_configured_consumer_name_wins() {
        let config = QueueConfig {
            consumer_name: Some("worker-7".to_string()),
            ..Default::default()
        };

        assert_eq!(consumer_name(&config), "worker-7");
    }
}
