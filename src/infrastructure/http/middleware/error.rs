use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Contention on the store; safe to retry
    Conflict(String),
    /// A store attempt exceeded its time budget; safe to retry
    Timeout(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Conflict(_) | ApiError::Timeout(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                ApiError::Timeout("Timed out waiting for a database connection".to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    if message.contains("assignments") {
                        ApiError::Conflict(
                            "Volunteer already holds an active assignment for this drive"
                                .to_string(),
                        )
                    } else {
                        ApiError::Conflict(format!("Duplicate record: {}", message))
                    }
                } else if message.contains("database is locked")
                    || message.contains("busy")
                    || message.contains("could not serialize")
                    || message.contains("deadlock")
                {
                    ApiError::Conflict(format!("Store contention: {}", message))
                } else {
                    ApiError::Internal(format!("Database error: {}", message))
                }
            }
            other => {
                tracing::error!("Unhandled database error: {}", other);
                ApiError::Internal(format!("Database error: {}", other))
            }
        }
    }
}

// Convert from domain errors
impl From<crate::domain::errors::DomainError> for ApiError {
    fn from(err: crate::domain::errors::DomainError) -> Self {
        match err {
            crate::domain::errors::DomainError::NotFound(msg) => ApiError::NotFound(msg),
            crate::domain::errors::DomainError::ValidationError(msg) => ApiError::BadRequest(msg),
            crate::domain::errors::DomainError::Conflict(msg) => ApiError::Conflict(msg),
            crate::domain::errors::DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
