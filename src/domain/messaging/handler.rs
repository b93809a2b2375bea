//! Message handler trait

use async_trait::async_trait;

use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Processes one message body
///
/// An `Err` means the message was not processed; the consumer decides
/// whether it is requeued or dropped.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, body: &[u8]) -> Result<(), DomainError>;
}
