//! What happens to a message whose handler failed

use serde::Deserialize;

use crate::domain::error::DomainError;

/// Redelivery decision for failed messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequeuePolicy {
    /// Every failure is returned to the queue
    #[default]
    Always,
    /// Failures that can never succeed are discarded, the rest are returned
    DropPermanent,
}

impl RequeuePolicy {
    /// Whether a message that failed with `error` goes back on the queue
    pub fn should_requeue(&self, error: &DomainError) -> bool {
        match self {
            Self::Always => true,
            Self::DropPermanent => !error.is_permanent(),
        }
    }
}
