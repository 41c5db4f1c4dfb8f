use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::services::payment_gateway::GatewayError;

/// Error type shared by every handler and service
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }
}

/// Unique-constraint violations become 409s, everything else stays a database error.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("Resource already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return ApiError::BadRequest("Referenced resource does not exist".to_string());
            }
        }
        ApiError::Database(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "Bad request", message),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed",
                errors.to_string(),
            ),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "Forbidden", message),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "Not found",
                format!("{} not found", resource),
            ),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "Conflict", message),
            ApiError::Gateway(err) => {
                tracing::error!(error = %err, "payment gateway error");
                (
                    StatusCode::BAD_GATEWAY,
                    "Payment gateway error",
                    err.to_string(),
                )
            }
            // Server-side details stay in the log
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error",
                    "An unexpected error occurred".to_string(),
                )
            }
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": label,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (ApiError::bad_request("missing name"), StatusCode::BAD_REQUEST),
            (ApiError::Forbidden("nope".to_string()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("Client"), StatusCode::NOT_FOUND),
            (ApiError::conflict("Email already exists"), StatusCode::CONFLICT),
            (ApiError::Auth(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (
                ApiError::Auth(AuthError::InsufficientPermissions),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound("Workout").to_string(), "Workout not found");
    }
}
