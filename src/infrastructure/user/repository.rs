//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Enforces the same uniqueness rules as the PostgreSQL schema. Locks are
/// always taken users first, then the email index.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// email -> user ID
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            email_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial users
    #[cfg(test)]
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut email_map = HashMap::new();

        for user in users {
            let id = user.id().as_str().to_string();
            email_map.insert(user.email().to_string(), id.clone());
            users_map.insert(id, user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            email_index: Arc::new(RwLock::new(email_map)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already in use",
                user.email()
            )));
        }

        email_index.insert(user.email().to_string(), id.clone());
        users.insert(id, user.clone());

        Ok(())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, DomainError> {
        let users = self.users.read().await;

        users
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str();

        let Some(existing) = users.get_mut(id) else {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        };

        let old_email = existing.email().to_string();

        if old_email != user.email() {
            if email_index.contains_key(user.email()) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already in use",
                    user.email()
                )));
            }

            email_index.remove(&old_email);
            email_index.insert(user.email().to_string(), id.to_string());
        }

        let created_at = existing.created_at();
        *existing = user.clone();
        existing.restore_created_at(created_at);

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        match users.remove(id.as_str()) {
            Some(user) => {
                email_index.remove(user.email());
                Ok(())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn find_inactive(&self, threshold: DateTime<Utc>) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .filter(|user| user.is_inactive_since(threshold))
            .cloned()
            .collect())
    }
}
