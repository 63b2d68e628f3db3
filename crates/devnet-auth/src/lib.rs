//! DevNet Authentication
//!
//! This crate provides password hashing, JWT issuance/validation and the
//! token middleware that guards private DevNet routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, DEFAULT_TOKEN_EXPIRY_SECS, JwtManager, TokenUser};
pub use middleware::{AUTH_TOKEN_HEADER, AuthUser, auth_middleware};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
