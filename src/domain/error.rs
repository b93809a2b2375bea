use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    #[error("Unknown event kind: {kind}")]
    UnknownEventKind { kind: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Queue unavailable: {message}")]
    QueueUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    pub fn unknown_event_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEventKind { kind: kind.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn queue_unavailable(message: impl Into<String>) -> Self {
        Self::QueueUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same input can never succeed.
    ///
    /// Backend outages are transient; everything caused by the content of the
    /// request itself (bad payload, missing target, uniqueness clash) is not.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::MalformedEvent { .. }
                | Self::UnknownEventKind { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::Validation { .. }
        )
    }
}
