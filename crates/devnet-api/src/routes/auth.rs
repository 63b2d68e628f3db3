//! Authentication routes

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use devnet_auth::{AuthError, AuthUser, verify_password_blocking};
use devnet_db::User;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{LoginRequest, TokenResponse};
use super::users::normalize_email;

/// Verified in place of a real hash when the email is unknown, so both
/// failure paths do the same Argon2 work. Never matches any password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// GET /api/auth (Authenticated)
async fn current_user(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .get_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// POST /api/auth
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&request.email);
    debug!("Login attempt for: {}", email);

    let Some(user) = state.db.get_user_by_email(&email).await? else {
        let _ = verify_password_blocking(request.password, DUMMY_HASH.to_string()).await;
        metrics::counter!("devnet_logins_total", "outcome" => "failure").increment(1);
        warn!("Login failed for: {}", email);
        return Err(AuthError::InvalidCredentials.into());
    };

    let password_valid = verify_password_blocking(request.password, user.password_hash).await?;
    if !password_valid {
        metrics::counter!("devnet_logins_total", "outcome" => "failure").increment(1);
        warn!("Login failed for: {}", email);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.generate_token(&user.id)?;

    metrics::counter!("devnet_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.id);

    Ok(Json(TokenResponse { token }))
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/auth", post(login))
}

/// Routes behind the token middleware
pub fn private_routes() -> Router<AppState> {
    Router::new().route("/api/auth", get(current_user))
}
