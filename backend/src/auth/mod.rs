//! Bearer-token authentication.
//!
//! This module provides:
//! - JWT token creation and validation
//! - `require_auth` middleware that puts the caller's [`types::AuthUser`] into
//!   the request extensions for handlers to pick up

mod jwt;
mod middleware;
pub mod types;

pub use jwt::{create_token, validate_token};
pub use middleware::require_auth;
pub use types::{AuthConfig, AuthUser};
