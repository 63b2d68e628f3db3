//! User registration route

use axum::{Json, Router, extract::State, routing::post};
use devnet_auth::hash_password_blocking;
use devnet_db::{DbError, NewUser};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{RegisterRequest, TokenResponse};

/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

const USER_EXISTS: &str = "User already exists";

/// Canonical form used for storage and lookup
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Gravatar URL for an email address
///
/// 200px, PG rated, "mystery person" placeholder when no image is registered.
fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

/// POST /api/users
async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::field(
            "password",
            "Password exceeds maximum length of 256 characters",
        ));
    }

    let email = normalize_email(&request.email);
    debug!("Registration attempt for: {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::field("email", USER_EXISTS));
    }

    let password_hash = hash_password_blocking(request.password).await?;

    let user = state
        .db
        .insert_user(NewUser {
            name: request.name.trim().to_string(),
            avatar: gravatar_url(&email),
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            DbError::Duplicate(_) => ApiError::field("email", USER_EXISTS),
            other => other.into(),
        })?;

    metrics::counter!("devnet_users_registered_total").increment(1);
    info!("Registered user {}", user.id);

    let token = state.jwt.generate_token(&user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users", post(register))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_ignores_case_and_whitespace() {
        let a = gravatar_url("a@x.com");
        let b = gravatar_url("  A@X.com ");

        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&r=pg&d=mm"));
        // sha256 hex digest
        let hash = a
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .trim_end_matches("?s=200&r=pg&d=mm");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }
}
