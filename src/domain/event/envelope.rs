//! Event envelope parsing
//!
//! Wire format:
//!
//! ```json
//! {"type": "user_created", "data": {"id": "u1", "name": "Ann", ...}}
//! ```
//!
//! The envelope is parsed in two steps so that an unrecognized `type` is
//! reported as such rather than as a generic deserialization failure.

use std::str::FromStr;

use serde::Deserialize;

use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Discriminator of a user event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventKind {
    Created,
    Updated,
    Deleted,
}

impl UserEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "user_created",
            Self::Updated => "user_updated",
            Self::Deleted => "user_deleted",
        }
    }
}

impl std::fmt::Display for UserEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserEventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_created" => Ok(Self::Created),
            "user_updated" => Ok(Self::Updated),
            "user_deleted" => Ok(Self::Deleted),
            other => Err(DomainError::unknown_event_kind(other)),
        }
    }
}

/// A parsed user event
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Created(User),
    Updated(User),
    /// Only the ID of a deleted user is meaningful
    Deleted(UserId),
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DeletedPayload {
    id: UserId,
}

impl UserEvent {
    /// Parse a raw message body
    ///
    /// Fails with `MalformedEvent` when the body is not an envelope or the
    /// payload does not fit the kind, and with `UnknownEventKind` when the
    /// discriminator is not recognized.
    pub fn parse(body: &[u8]) -> Result<Self, DomainError> {
        let envelope: RawEnvelope = serde_json::from_slice(body)
            .map_err(|e| DomainError::malformed_event(format!("Invalid envelope: {}", e)))?;

        let kind: UserEventKind = envelope.kind.parse()?;

        match kind {
            UserEventKind::Created => Ok(Self::Created(parse_user(kind, envelope.data)?)),
            UserEventKind::Updated => Ok(Self::Updated(parse_user(kind, envelope.data)?)),
            UserEventKind::Deleted => {
                let payload: DeletedPayload =
                    serde_json::from_value(envelope.data).map_err(|e| payload_error(kind, e))?;
                Ok(Self::Deleted(payload.id))
            }
        }
    }

    pub fn kind(&self) -> UserEventKind {
        match self {
            Self::Created(_) => UserEventKind::Created,
            Self::Updated(_) => UserEventKind::Updated,
            Self::Deleted(_) => UserEventKind::Deleted,
        }
    }

    /// ID of the user the event is about
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Created(user) | Self::Updated(user) => user.id(),
            Self::Deleted(id) => id,
        }
    }
}

fn parse_user(kind: UserEventKind, data: serde_json::Value) -> Result<User, DomainError> {
    serde_json::from_value(data).map_err(|e| payload_error(kind, e))
}

fn payload_error(kind: UserEventKind, err: serde_json::Error) -> DomainError {
    DomainError::malformed_event(format!("Invalid {} payload: {}", kind, err))
}
