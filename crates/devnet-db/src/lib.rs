//! DevNet Database Layer
//!
//! This crate provides the persistence layer for DevNet: the credential,
//! profile and post stores, using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
