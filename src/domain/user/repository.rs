//! User repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Store contract for users
///
/// Implementations are shared across tasks and must be safe for concurrent
/// use. Reads may be served from a replica, so a read immediately after a
/// write is not guaranteed to observe it.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Create a new user. Fails with `Conflict` if the ID or email is taken.
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    /// Get a user by ID. Fails with `NotFound` if absent.
    async fn get_by_id(&self, id: &UserId) -> Result<User, DomainError>;

    /// Replace an existing user. Fails with `NotFound` if the ID is unknown;
    /// never inserts. The stored creation timestamp is kept.
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Delete a user. Fails with `NotFound` if absent.
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;

    /// All users whose last activity is strictly before `threshold`, in no
    /// particular order
    async fn find_inactive(&self, threshold: DateTime<Utc>) -> Result<Vec<User>, DomainError>;
}
