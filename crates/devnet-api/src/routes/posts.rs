//! Post routes
//!
//! Every mutation re-reads the post first: missing posts are 404, and
//! deletes check the caller against the owner recorded on the post or
//! comment before touching anything.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use devnet_auth::AuthUser;
use devnet_db::{Comment, DbError, Like, NewComment, NewPost, Post, User};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{MessageResponse, TextRequest};

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

async fn load_post(state: &AppState, id: &str) -> Result<Post, ApiError> {
    state.db.get_post(id).await?.ok_or_else(post_not_found)
}

/// The full user record behind a token
async fn load_author(state: &AppState, user: &AuthUser) -> Result<User, ApiError> {
    state
        .db
        .get_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

// ==================== Post Routes ====================

/// POST /api/posts (Authenticated)
async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    let author = load_author(&state, &user).await?;

    let post = state
        .db
        .insert_post(NewPost {
            user_id: author.id,
            text: request.text,
            name: author.name,
            avatar: author.avatar,
        })
        .await?;

    metrics::counter!("devnet_posts_created_total").increment(1);
    info!("User {} created post {}", user.id, post.id);
    Ok(Json(post))
}

/// GET /api/posts (Authenticated)
async fn list_posts(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.db.list_posts().await?))
}

/// GET /api/posts/{id} (Authenticated)
async fn get_post(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(load_post(&state, &id).await?))
}

/// DELETE /api/posts/{id} (Author only)
async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let post = load_post(&state, &id).await?;

    if post.user != user.id {
        return Err(ApiError::NotAuthorized);
    }

    state.db.delete_post(&post.id).await?;

    info!("User {} deleted post {}", user.id, post.id);
    Ok(Json(MessageResponse::new("Post removed")))
}

// ==================== Like Routes ====================

/// PUT /api/posts/like/{id} (Authenticated)
async fn like_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post = load_post(&state, &id).await?;

    if post.is_liked_by(&user.id) {
        return Err(ApiError::BadRequest("Post already liked".to_string()));
    }

    state
        .db
        .add_like(&post.id, &user.id)
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::BadRequest("Post already liked".to_string()),
            other => other.into(),
        })?;

    debug!("User {} liked post {}", user.id, post.id);
    Ok(Json(state.db.list_likes(&post.id).await?))
}

/// PUT /api/posts/unlike/{id} (Authenticated)
async fn unlike_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post = load_post(&state, &id).await?;

    if !post.is_liked_by(&user.id) {
        return Err(ApiError::BadRequest("Post has not yet been liked".to_string()));
    }

    state.db.remove_like(&post.id, &user.id).await?;

    debug!("User {} unliked post {}", user.id, post.id);
    Ok(Json(state.db.list_likes(&post.id).await?))
}

// ==================== Comment Routes ====================

/// POST /api/posts/comment/{id} (Authenticated)
async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<TextRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let author = load_author(&state, &user).await?;
    let post = load_post(&state, &id).await?;

    state
        .db
        .add_comment(
            &post.id,
            NewComment {
                user_id: author.id,
                text: request.text,
                name: author.name,
                avatar: author.avatar,
            },
        )
        .await?;

    debug!("User {} commented on post {}", user.id, post.id);
    Ok(Json(state.db.list_comments(&post.id).await?))
}

/// DELETE /api/posts/comment/{id}/{comment_id} (Comment author only)
async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let post = load_post(&state, &id).await?;

    let comment = post
        .comment(&comment_id)
        .ok_or_else(|| ApiError::NotFound("Comment does not exist".to_string()))?;

    if comment.user != user.id {
        return Err(ApiError::NotAuthorized);
    }

    state.db.remove_comment(&post.id, &comment.id).await?;

    debug!("User {} deleted comment {} on post {}", user.id, comment.id, post.id);
    Ok(Json(state.db.list_comments(&post.id).await?))
}

/// Create post routes (all behind the token middleware)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", post(create_post))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{id}", get(get_post))
        .route("/api/posts/{id}", delete(delete_post))
        .route("/api/posts/like/{id}", put(like_post))
        .route("/api/posts/unlike/{id}", put(unlike_post))
        .route("/api/posts/comment/{id}", post(add_comment))
        .route("/api/posts/comment/{id}/{comment_id}", delete(delete_comment))
}
