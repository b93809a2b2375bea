//! Queue contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// A message handed out by a queue and awaiting acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Backend-specific handle used to ack or nack this delivery
    pub tag: String,
    pub body: Vec<u8>,
    /// Whether the message has been delivered before
    pub redelivered: bool,
}

impl Delivery {
    pub fn new(tag: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: tag.into(),
            body: body.into(),
            redelivered: false,
        }
    }

    pub fn redelivered(mut self) -> Self {
        self.redelivered = true;
        self
    }
}

/// An at-least-once queue with manual acknowledgement
///
/// Every delivery handed out by `receive` stays owned by the queue until it
/// is acked (removed) or nacked (requeued for redelivery or dropped).
#[async_trait]
pub trait MessageQueue: Send + Sync + Debug {
    /// Ensures the named queue exists: durable, not auto-deleted, not exclusive
    async fn declare(&self, queue: &str) -> Result<(), DomainError>;

    /// Waits for the next delivery. `Ok(None)` means the backend's poll
    /// window elapsed with nothing to hand out.
    async fn receive(&self, queue: &str) -> Result<Option<Delivery>, DomainError>;

    /// Positive acknowledgement - the message is removed from the queue
    async fn ack(&self, queue: &str, delivery: &Delivery) -> Result<(), DomainError>;

    /// Negative acknowledgement - the message is returned to the queue when
    /// `requeue` is set, discarded otherwise
    async fn nack(&self, queue: &str, delivery: &Delivery, requeue: bool)
        -> Result<(), DomainError>;

    /// Releases the underlying connection
    async fn close(&self) -> Result<(), DomainError>;
}
