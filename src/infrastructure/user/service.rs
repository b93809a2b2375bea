//! User service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Orchestrates user operations over the store
///
/// Every operation passes straight through; store errors come back
/// unchanged.
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, user: &User) -> Result<(), DomainError> {
        debug!(user_id = %user.id(), "Creating user");
        self.repository.create(user).await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository.get_by_id(id).await
    }

    pub async fn update_user(&self, user: &User) -> Result<(), DomainError> {
        debug!(user_id = %user.id(), "Updating user");
        self.repository.update(user).await
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), DomainError> {
        debug!(user_id = %id, "Deleting user");
        self.repository.delete(id).await
    }

    /// Users whose last activity is strictly before `threshold`
    pub async fn find_inactive_users(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<User>, DomainError> {
        self.repository.find_inactive(threshold).await
    }
}
