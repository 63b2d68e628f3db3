//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Status code and client-facing message
    ///
    /// Every token failure reads "Token is not valid" so callers cannot tell
    /// a bad signature from an expired or malformed token.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid Credentials"),
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "No token, authorization denied")
            }
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "Token is not valid")
            }
            AuthError::PasswordHash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}
