//! Redis Streams message queue
//!
//! A queue maps to a stream read through a consumer group. Delivered entries
//! stay in the consumer's pending list until they are acknowledged, so a
//! requeue is simply "do not ack": every `receive` reads this consumer's
//! pending entries before asking for new ones.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};
use tracing::{debug, info, warn};

use crate::domain::messaging::{Delivery, MessageQueue};
use crate::domain::DomainError;

/// Stream entry field holding the message body
const PAYLOAD_FIELD: &str = "payload";

type StreamEntry = (String, Vec<(String, Vec<u8>)>);
type StreamReply = Vec<(String, Vec<StreamEntry>)>;

/// Configuration for the Redis Streams queue
#[derive(Debug, Clone)]
pub struct RedisStreamConfig {
    pub url: String,
    pub consumer_group: String,
    pub consumer_name: String,
    /// How long a read for new entries blocks server-side
    pub block_timeout: Duration,
    pub connection_timeout: Duration,
}

impl RedisStreamConfig {
    pub fn new(
        url: impl Into<String>,
        consumer_group: impl Into<String>,
        consumer_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            consumer_group: consumer_group.into(),
            consumer_name: consumer_name.into(),
            block_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_block_timeout(mut self, timeout: Duration) -> Self {
        self.block_timeout = timeout;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Queue backed by Redis Streams consumer groups
#[derive(Clone)]
pub struct RedisStreamQueue {
    connection: ConnectionManager,
    config: RedisStreamConfig,
}

impl fmt::Debug for RedisStreamQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStreamQueue")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStreamQueue {
    pub async fn connect(config: RedisStreamConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::queue_unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| DomainError::queue_unavailable("Timed out connecting to Redis"))?
        .map_err(|e| DomainError::queue_unavailable(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    /// Appends a message to the stream, returning the entry ID
    pub async fn publish(&self, queue: &str, body: &[u8]) -> Result<String, DomainError> {
        let mut conn = self.connection.clone();

        redis::cmd("XADD")
            .arg(queue)
            .arg("*")
            .arg(PAYLOAD_FIELD)
            .arg(body)
            .query_async(&mut conn)
            .await
            .map_err(|e| queue_error("publish to", queue, e))
    }

    /// Entries already delivered to this consumer and not yet acked
    async fn read_pending(&self, queue: &str) -> Result<Option<Delivery>, DomainError> {
        loop {
            let mut conn = self.connection.clone();

            let reply: Option<StreamReply> = redis::cmd("XREADGROUP")
                .arg("GROUP")
                .arg(&self.config.consumer_group)
                .arg(&self.config.consumer_name)
                .arg("COUNT")
                .arg(1)
                .arg("STREAMS")
                .arg(queue)
                .arg("0")
                .query_async(&mut conn)
                .await
                .map_err(|e| queue_error("read pending from", queue, e))?;

            let Some((id, fields)) = reply.and_then(first_entry) else {
                return Ok(None);
            };

            match payload(&fields) {
                Some(body) => return Ok(Some(Delivery::new(id, body).redelivered())),
                None => {
                    // Trimmed entries come back without fields and can never be processed
                    warn!(queue = %queue, entry_id = %id, "Discarding pending entry without payload");
                    self.xack(queue, &id).await?;
                }
            }
        }
    }

    async fn read_new(&self, queue: &str) -> Result<Option<Delivery>, DomainError> {
        let mut conn = self.connection.clone();

        let reply: Option<StreamReply> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_name)
            .arg("COUNT")
            .arg(1)
            .arg("BLOCK")
            .arg(self.config.block_timeout.as_millis() as u64)
            .arg("STREAMS")
            .arg(queue)
            .arg(">")
            .query_async(&mut conn)
            .await
            .map_err(|e| queue_error("read from", queue, e))?;

        let Some((id, fields)) = reply.and_then(first_entry) else {
            return Ok(None);
        };

        match payload(&fields) {
            Some(body) => Ok(Some(Delivery::new(id, body))),
            None => {
                warn!(queue = %queue, entry_id = %id, "Discarding entry without payload");
                self.xack(queue, &id).await?;
                Ok(None)
            }
        }
    }

    async fn xack(&self, queue: &str, id: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(queue)
            .arg(&self.config.consumer_group)
            .arg(id)
            .query_async(&mut conn)
            .await
            .map_err(|e| queue_error("acknowledge on", queue, e))?;

        Ok(())
    }
}

fn first_entry(reply: StreamReply) -> Option<StreamEntry> {
    reply
        .into_iter()
        .next()
        .and_then(|(_stream, entries)| entries.into_iter().next())
}

fn payload(fields: &[(String, Vec<u8>)]) -> Option<Vec<u8>> {
    fields
        .iter()
        .find(|(name, _)| name == PAYLOAD_FIELD)
        .map(|(_, value)| value.clone())
}

fn queue_error(action: &str, queue: &str, err: redis::RedisError) -> DomainError {
    DomainError::queue_unavailable(format!("Failed to {} stream '{}': {}", action, queue, err))
}

#[async_trait]
impl MessageQueue for RedisStreamQueue {
    async fn declare(&self, queue: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(queue)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %queue,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %queue,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
                Ok(())
            }
            Err(e) => Err(queue_error("declare", queue, e)),
        }
    }

    async fn receive(&self, queue: &str) -> Result<Option<Delivery>, DomainError> {
        if let Some(delivery) = self.read_pending(queue).await? {
            return Ok(Some(delivery));
        }

        self.read_new(queue).await
    }

    async fn ack(&self, queue: &str, delivery: &Delivery) -> Result<(), DomainError> {
        self.xack(queue, &delivery.tag).await
    }

    async fn nack(
        &self,
        queue: &str,
        delivery: &Delivery,
        requeue: bool,
    ) -> Result<(), DomainError> {
        if requeue {
            // Left in the pending list; the next receive picks it up again
            return Ok(());
        }

        self.xack(queue, &delivery.tag).await
    }

    async fn close(&self) -> Result<(), DomainError> {
        debug!(consumer = %self.config.consumer_name, "Releasing Redis stream connection");
        Ok(())
    }
}
