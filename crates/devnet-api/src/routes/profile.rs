//! Profile routes

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use devnet_auth::AuthUser;
use devnet_db::{NewExperience, Profile, ProfileFields};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{ExperienceRequest, MessageResponse, ProfileRequest};

fn no_profile() -> ApiError {
    ApiError::NotFound("There is no profile for this user".to_string())
}

/// GET /api/profile/me (Authenticated)
async fn my_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .get_profile_by_user(&user.id)
        .await?
        .ok_or_else(no_profile)?;

    Ok(Json(profile))
}

/// POST /api/profile (Authenticated)
async fn upsert_profile(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    debug!("Saving profile for user: {}", user.id);

    let fields = ProfileFields::try_from(request)?;

    let profile = state.db.upsert_profile(&user.id, fields).await?;

    info!("Saved profile for user {}", user.id);
    Ok(Json(profile))
}

/// GET /api/profile
async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.db.list_profiles().await?))
}

/// GET /api/profile/user/{user_id}
async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .db
        .get_profile_by_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// DELETE /api/profile (Authenticated)
///
/// Removes the profile, then the user. The user's posts are left in place.
async fn delete_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting profile and user: {}", user.id);

    state.db.delete_profile(&user.id).await?;
    state.db.delete_user(&user.id).await?;

    info!("Deleted user {}", user.id);
    Ok(Json(MessageResponse::new("User deleted")))
}

/// PUT /api/profile/experience (Authenticated)
async fn add_experience(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    let experience = NewExperience::try_from(request)?;

    if !state.db.add_experience(&user.id, experience).await? {
        return Err(no_profile());
    }

    let profile = state
        .db
        .get_profile_by_user(&user.id)
        .await?
        .ok_or_else(no_profile)?;

    info!("Added experience to profile of user {}", user.id);
    Ok(Json(profile))
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(list_profiles))
        .route("/api/profile/user/{user_id}", get(profile_by_user))
}

/// Routes behind the token middleware
pub fn private_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", post(upsert_profile))
        .route("/api/profile", delete(delete_profile))
        .route("/api/profile/me", get(my_profile))
        .route("/api/profile/experience", put(add_experience))
}
