//! API routes

mod auth;
mod health;
mod posts;
mod profile;
pub mod types;
mod users;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, Uri, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use devnet_auth::auth_middleware;
use rust_embed::Embed;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Embedded static files of the single-page frontend
#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../static"]
struct Assets;

/// Handler for serving embedded static files
async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Unknown API paths are a plain 404, not the SPA shell
    if path.starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    if let Some(content) = <Assets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        (
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response()
    } else if let Some(content) = <Assets as Embed>::get("index.html") {
        // SPA fallback: serve index.html for any unmatched route
        Html(content.data.into_owned()).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// GET /metrics - Prometheus metrics endpoint
async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Create the main router
///
/// Private routes share paths with public ones (`/api/auth`, `/api/profile`);
/// the token middleware is attached per route so only the private methods
/// are guarded.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let private = Router::new()
        .merge(auth::private_routes())
        .merge(profile::private_routes())
        .merge(posts::routes())
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Public API
        .merge(users::routes())
        .merge(auth::public_routes())
        .merge(profile::public_routes())
        // Token-guarded API
        .merge(private)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(render_metrics))
                .with_state(handle),
        );
    }

    // Serve embedded static files (SPA) - must be last to not interfere with API routes
    router.fallback(serve_embedded_file)
}
