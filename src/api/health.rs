//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready - 503 while the user store cannot be queried
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let store_check = check_user_store(&state).await;
    let status = store_check.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
        checks: Some(vec![store_check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Nobody was active before the epoch, so this is a cheap round trip
async fn check_user_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state
        .user_service
        .find_inactive_users(DateTime::<Utc>::UNIX_EPOCH)
        .await
    {
        Ok(_) => (HealthStatus::Healthy, None),
        Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
    };

    HealthCheck {
        name: "user_store".to_string(),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::create_router;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::UserService;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn setup() -> (Arc<MockUserRepository>, axum::Router) {
        let repository = Arc::new(MockUserRepository::new());
        let state = AppState::new(Arc::new(UserService::new(repository.clone())));
        (repository, create_router(state))
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_, router) = setup();
        let (status, body) = get(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["time"].is_string());
        assert!(body.get("checks").is_none());
    }

    #[tokio::test]
    async fn test_ready_reflects_store() {
        let (repository, router) = setup();
        let (status, body) = get(router.clone(), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "user_store");

        repository.set_should_fail(true).await;
        let (status, body) = get(router, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_live_endpoint() {
        let (_, router) = setup();
        let (status, _) = get(router, "/live").await;
        assert_eq!(status, StatusCode::OK);
    }
}
