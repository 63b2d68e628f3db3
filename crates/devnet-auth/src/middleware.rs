//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Header carrying the raw token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user.id.clone(),
        }
    }
}

/// Authentication middleware
///
/// Reads the token from the `x-auth-token` header. Requests without a token
/// or with a token that fails validation are rejected; otherwise the
/// resolved [`AuthUser`] is added to the request extensions. No store
/// lookups happen here.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let claims = jwt_manager.validate_token(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        e
    })?;
    let user = AuthUser::from_claims(&claims);

    debug!("Authenticated user: {}", user.id);

    // Add user to request extensions
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Handlers behind [`auth_middleware`] take the caller as an argument
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
