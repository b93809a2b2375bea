//! Cache-aside decorator for a user repository

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::cache::{user_key, Cache, CacheExt};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// User repository wrapper that reads through a cache
///
/// Lookups by ID are served from the cache when possible and populate it on
/// a miss. Updates and deletes invalidate the entry once the store call has
/// returned. Cache failures are logged and never fail the operation; the
/// store stays the source of truth.
#[derive(Debug)]
pub struct CachedUserRepository {
    inner: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CachedUserRepository {
    pub fn new(inner: Arc<dyn UserRepository>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    async fn invalidate(&self, id: &UserId) {
        if let Err(e) = self.cache.delete(&user_key(id)).await {
            warn!(user_id = %id, error = %e, "Failed to invalidate cached user");
        }
    }
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        self.inner.create(user).await
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, DomainError> {
        let key = user_key(id);

        match self.cache.get::<User>(&key).await {
            Ok(Some(user)) => {
                debug!(user_id = %id, "Cache hit for user");
                return Ok(user);
            }
            Ok(None) => debug!(user_id = %id, "Cache miss for user"),
            Err(e) => warn!(user_id = %id, error = %e, "Failed to read cached user"),
        }

        let user = self.inner.get_by_id(id).await?;

        if let Err(e) = self.cache.set(&key, &user, self.ttl).await {
            warn!(user_id = %id, error = %e, "Failed to cache user");
        }

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = self.inner.update(user).await;
        self.invalidate(user.id()).await;
        result
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let result = self.inner.delete(id).await;
        self.invalidate(id).await;
        result
    }

    async fn find_inactive(&self, threshold: DateTime<Utc>) -> Result<Vec<User>, DomainError> {
        self.inner.find_inactive(threshold).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::user::MockUserRepository;
    use chrono::TimeZone;

    fn create_test_user(id: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User::new(UserId::new(id).unwrap(), "Ann", "ann@x.com", "p", at, at)
    }

    fn setup(cache: MockCache) -> (Arc<MockUserRepository>, Arc<MockCache>, CachedUserRepository) {
        let inner = Arc::new(MockUserRepository::new());
        let cache = Arc::new(cache);
        let repo = CachedUserRepository::new(
            inner.clone(),
            cache.clone(),
            Duration::from_secs(60),
        );
        (inner, cache, repo)
    }

    #[tokio::test]
    async fn test_get_reads_through_once() {
        let (inner, cache, repo) = setup(MockCache::new());
        let user = create_test_user("u1");
        inner.seed(user.clone()).await;

        assert_eq!(repo.get_by_id(user.id()).await.unwrap(), user);
        assert_eq!(repo.get_by_id(user.id()).await.unwrap(), user);

        assert_eq!(inner.get_calls(), 1);
        assert!(cache.contains("user:u1"));
        assert_eq!(cache.ttl_of("user:u1"), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_cached() {
        let (inner, cache, repo) = setup(MockCache::new());

        let result = repo.get_by_id(&UserId::new("u1").unwrap()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(!cache.contains("user:u1"));
        assert_eq!(inner.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates() {
        let (inner, cache, repo) = setup(MockCache::new());
        let user = create_test_user("u1");
        inner.seed(user.clone()).await;
        repo.get_by_id(user.id()).await.unwrap();

        let mut changed = user.clone();
        changed.set_name("Annie");
        repo.update(&changed).await.unwrap();
        assert!(!cache.contains("user:u1"));

        let fetched = repo.get_by_id(user.id()).await.unwrap();
        assert_eq!(fetched.name(), "Annie");
        assert_eq!(inner.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_invalidates() {
        let (inner, cache, repo) = setup(MockCache::new());
        let user = create_test_user("u1");
        inner.seed(user.clone()).await;
        repo.get_by_id(user.id()).await.unwrap();

        repo.delete(user.id()).await.unwrap();
        assert!(!cache.contains("user:u1"));

        let result = repo.get_by_id(user.id()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cache_failure_falls_back_to_store() {
        let (inner, _cache, repo) = setup(MockCache::new().with_error("redis down"));
        let user = create_test_user("u1");
        inner.seed(user.clone()).await;

        assert_eq!(repo.get_by_id(user.id()).await.unwrap(), user);
        repo.delete(user.id()).await.unwrap();
        assert_eq!(inner.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let (inner, _cache, repo) = setup(MockCache::new());
        inner.set_should_fail(true).await;

        let result = repo.create(&create_test_user("u1")).await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    }
}
