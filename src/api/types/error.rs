//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ConflictError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error body: `{"error": {"message", "type", "param"?, "code"?}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    /// Name the offending request parameter
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::MalformedEvent { .. } => {
                Self::bad_request(err.to_string()).with_code("malformed_event")
            }
            DomainError::UnknownEventKind { .. } => {
                Self::bad_request(err.to_string()).with_code("unknown_event_kind")
            }
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::StoreUnavailable { message } => {
                Self::unavailable(message).with_code("store_unavailable")
            }
            DomainError::Cache { message } => Self::unavailable(message).with_code("cache"),
            DomainError::QueueUnavailable { message } => {
                Self::unavailable(message).with_code("queue_unavailable")
            }
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn test_domain_error_status_mapping() {
        assert_eq!(status_of(DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::malformed_event("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::unknown_event_kind("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::store_unavailable("x")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(DomainError::cache("x")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(DomainError::queue_unavailable("x")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DomainError::configuration("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(DomainError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_conflict_keeps_message() {
        let err = ApiError::from(DomainError::conflict("Email 'ann@x.com' is already in use"));

        assert_eq!(err.response.error.error_type, ApiErrorType::ConflictError);
        assert_eq!(err.response.error.message, "Email 'ann@x.com' is already in use");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::bad_request("Invalid user ID").with_param("id");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "id");
        assert!(json["error"].get("code").is_none());
    }
}
