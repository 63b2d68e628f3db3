//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User is not authorized")]
    NotAuthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] devnet_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] devnet_auth::AuthError),
}

impl ApiError {
    /// Validation error on a single field
    pub fn field(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    }
}

const SERVER_ERROR: &str = "Server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(errors) => {
                let body = axum::Json(json!({ "errors": errors }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::NotAuthorized => (
                StatusCode::UNAUTHORIZED,
                "User is not authorized".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
            }
            ApiError::Database(e) => match e {
                devnet_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                devnet_db::DbError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg),
                other => {
                    error!("Database error: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
                }
            },
            ApiError::Auth(e) => {
                if let devnet_auth::AuthError::PasswordHash(detail) = &e {
                    error!("Password hashing failed: {}", detail);
                }
                let (status, message) = e.status_and_message();
                (status, message.to_string())
            }
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email(message = "Please include a valid email"))]
        email: String,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed_per_field() {
        let invalid = Signup {
            name: String::new(),
            email: "nope".to_string(),
        };
        let error = ApiError::from(invalid.validate().unwrap_err());

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": [
                { "field": "email", "message": "Please include a valid email" },
                { "field": "name", "message": "Name is required" },
            ]})
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let error = ApiError::Database(devnet_db::DbError::Migration("disk on fire".to_string()));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "message": "Server error" }));
    }

    #[tokio::test]
    async fn test_ownership_failure_is_unauthorized() {
        let response = ApiError::NotAuthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "User is not authorized" })
        );
    }
}
