//! DevNet REST API
//!
//! This crate provides the Axum-based HTTP API for DevNet: registration and
//! login, developer profiles, and posts with likes and comments.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, FieldError};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
