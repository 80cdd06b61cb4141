//! Unified error handling for the backend API.
//!
//! Handlers return [`ApiResult`] and use `?`; the error turns into a status
//! code and an [`ErrorResponse`] body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planner_shared::api::ErrorResponse;
use thiserror::Error;

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database connection pool error
    #[error("Database connection error")]
    ConnectionPool(#[source] deadpool_diesel::sqlite::PoolError),

    /// A query closure on the blocking pool panicked or was aborted
    #[error("Database worker failed: {0}")]
    Interact(String),

    /// Database query error
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Resource not found (or not owned by the caller)
    #[error("{0} not found")]
    NotFound(String),

    /// Path id missing or not an integer
    #[error("Needs an id")]
    MissingId,

    /// Request body is not JSON or does not fit the request type
    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    /// Request body failed validation
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Authentication missing, malformed or expired
    #[error("Not Authorized")]
    Unauthorized,
}

impl ApiError {
    /// Create a not found error for a resource name
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized
    }

    /// Wrap the failure of a blocking database closure
    pub fn interact(err: impl std::fmt::Display) -> Self {
        ApiError::Interact(err.to_string())
    }
}

impl From<deadpool_diesel::sqlite::PoolError> for ApiError {
    fn from(err: deadpool_diesel::sqlite::PoolError) -> Self {
        ApiError::ConnectionPool(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            ApiError::ConnectionPool(e) => {
                tracing::error!("Connection pool error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection unavailable".to_string(),
                    None,
                )
            }
            ApiError::Interact(e) => {
                tracing::error!("Database worker error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    None,
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    None,
                )
            }
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                None,
            ),
            ApiError::MissingId => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ApiError::Body(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection);
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid request".to_string(),
                    Some(rejection.body_text()),
                )
            }
            ApiError::Validation(e) => {
                tracing::debug!("Validation failed: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid request".to_string(),
                    Some(e.to_string()),
                )
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::MissingId.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized().into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("Task").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(diesel::result::Error::RollbackTransaction)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::interact("panicked").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_client_expectations() {
        assert_eq!(ApiError::MissingId.to_string(), "Needs an id");
        assert_eq!(ApiError::Unauthorized.to_string(), "Not Authorized");
        assert_eq!(ApiError::not_found("Event").to_string(), "Event not found");
    }
}
