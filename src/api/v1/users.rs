//! User endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};

/// Request to create a user
///
/// Timestamps default to the time of the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserApiRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full replacement of a user; the ID comes from the path
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserApiRequest {
    /// Ignored in favor of the path ID
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

/// User as returned by the API; the password never leaves the service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub last_active_at: DateTime<Utc>,
    /// Absent when the stored value could not be read back after an update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            last_active_at: user.last_active_at(),
            created_at: Some(user.created_at()),
        }
    }
}

fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    UserId::new(id).map_err(|e| ApiError::bad_request(e.to_string()).with_param("id"))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} cannot be empty", field)).with_param(field));
    }
    Ok(())
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(user_id = %request.id, "Creating user");

    let id = parse_user_id(&request.id)?;
    require_non_empty("name", &request.name)?;
    require_non_empty("email", &request.email)?;

    let now = Utc::now();
    let user = User::new(
        id,
        request.name,
        request.email,
        request.password,
        request.last_active_at.unwrap_or(now),
        request.created_at.unwrap_or(now),
    );

    state.user_service.create_user(&user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Getting user");

    let id = parse_user_id(&user_id)?;
    let user = state.user_service.get_user(&id).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, body_id = ?request.id, "Updating user");

    let id = parse_user_id(&user_id)?;
    require_non_empty("name", &request.name)?;
    require_non_empty("email", &request.email)?;

    let now = Utc::now();
    let user = User::new(
        id,
        request.name,
        request.email,
        request.password,
        request.last_active_at.unwrap_or(now),
        now,
    );

    state.user_service.update_user(&user).await?;

    // The store keeps the original creation time; report what is stored
    let mut response = UserResponse::from(&user);
    match state.user_service.get_user(user.id()).await {
        Ok(stored) => response.created_at = Some(stored.created_at()),
        Err(e) => {
            warn!(user_id = %user.id(), error = %e, "Failed to read back updated user");
            response.created_at = None;
        }
    }

    Ok(Json(response))
}

/// DELETE /api/v1/users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user_id, "Deleting user");

    let id = parse_user_id(&user_id)?;
    state.user_service.delete_user(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::create_router;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::UserService;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn setup() -> (Arc<MockUserRepository>, axum::Router) {
        let repository = Arc::new(MockUserRepository::new());
        let state = AppState::new(Arc::new(UserService::new(repository.clone())));
        (repository, create_router(state))
    }

    fn seeded_user(id: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User::new(UserId::new(id).unwrap(), "Ann", "ann@x.com", "p", at, at)
    }

    async fn send(
        router: axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_create_user() {
        let (repository, router) = setup();

        let (status, body) = send(
            router,
            "POST",
            "/api/v1/users",
            Some(serde_json::json!({
                "id": "u1",
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p",
                "lastActiveAt": "2024-01-01T00:00:00Z"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "u1");
        assert_eq!(body["lastActiveAt"], "2024-01-01T00:00:00Z");
        assert!(body.get("password").is_none());
        assert_eq!(repository.stored("u1").await.unwrap().password(), "p");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let (repository, router) = setup();
        repository.seed(seeded_user("u1")).await;

        let (status, body) = send(
            router,
            "POST",
            "/api/v1/users",
            Some(serde_json::json!({
                "id": "u1",
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["type"], "conflict_error");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_body() {
        let (repository, router) = setup();

        let (status, body) = send(
            router.clone(),
            "POST",
            "/api/v1/users",
            Some(serde_json::json!({ "id": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "invalid_json");

        let (status, body) = send(
            router,
            "POST",
            "/api/v1/users",
            Some(serde_json::json!({
                "id": "has space",
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "id");
        assert_eq!(repository.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_get_user() {
        let (repository, router) = setup();
        repository.seed(seeded_user("u1")).await;

        let (status, body) = send(router.clone(), "GET", "/api/v1/users/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["createdAt"], "2024-01-01T00:00:00Z");

        let (status, body) = send(router, "GET", "/api/v1/users/u2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_update_uses_path_id() {
        let (repository, router) = setup();
        repository.seed(seeded_user("u1")).await;

        let (status, body) = send(
            router,
            "PUT",
            "/api/v1/users/u1",
            Some(serde_json::json!({
                "id": "other",
                "name": "Annie",
                "email": "annie@x.com",
                "password": "p2"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "u1");
        assert_eq!(body["createdAt"], "2024-01-01T00:00:00Z");

        let stored = repository.stored("u1").await.unwrap();
        assert_eq!(stored.name(), "Annie");
        assert!(repository.stored("other").await.is_none());
    }

    /// Store whose lookups fail while writes go through
    #[derive(Debug)]
    struct FailingReads(Arc<MockUserRepository>);

    #[async_trait::async_trait]
    impl crate::domain::user::UserRepository for FailingReads {
        async fn create(&self, user: &User) -> Result<(), crate::domain::DomainError> {
            self.0.create(user).await
        }

        async fn get_by_id(&self, _id: &UserId) -> Result<User, crate::domain::DomainError> {
            Err(crate::domain::DomainError::store_unavailable("replica down"))
        }

        async fn update(&self, user: &User) -> Result<(), crate::domain::DomainError> {
            self.0.update(user).await
        }

        async fn delete(&self, id: &UserId) -> Result<(), crate::domain::DomainError> {
            self.0.delete(id).await
        }

        async fn find_inactive(
            &self,
            threshold: DateTime<Utc>,
        ) -> Result<Vec<User>, crate::domain::DomainError> {
            self.0.find_inactive(threshold).await
        }
    }

    #[tokio::test]
    async fn test_update_omits_created_at_when_read_back_fails() {
        let repository = Arc::new(MockUserRepository::new());
        repository.seed(seeded_user("u1")).await;
        let service = UserService::new(Arc::new(FailingReads(repository.clone())));
        let router = create_router(AppState::new(Arc::new(service)));

        let (status, body) = send(
            router,
            "PUT",
            "/api/v1/users/u1",
            Some(serde_json::json!({
                "name": "Annie",
                "email": "annie@x.com",
                "password": "p2"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Annie");
        assert!(body.get("createdAt").is_none());

        let stored = repository.stored("u1").await.unwrap();
        assert_eq!(stored.name(), "Annie");
        assert_eq!(stored.created_at(), seeded_user("u1").created_at());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_, router) = setup();

        let (status, _) = send(
            router,
            "PUT",
            "/api/v1/users/u9",
            Some(serde_json::json!({
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (repository, router) = setup();
        repository.seed(seeded_user("u1")).await;

        let (status, _) = send(router.clone(), "DELETE", "/api/v1/users/u1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(repository.len().await, 0);

        let (status, _) = send(router, "DELETE", "/api/v1/users/u1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_outage_is_503() {
        let (repository, router) = setup();
        repository.set_should_fail(true).await;

        let (status, body) = send(router, "GET", "/api/v1/users/u1", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "store_unavailable");
    }
}
