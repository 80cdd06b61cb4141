//! Authentication middleware layer for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

use super::jwt;
use super::types::AuthUser;

/// Middleware function that requires authentication.
///
/// Used with `axum::middleware::from_fn_with_state`. On success the caller is
/// inserted into the request extensions as [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let config = &state.auth_config;

    // Try the Authorization header first, then the session cookie
    let token = extract_token_from_header(request.headers())
        .or_else(|| extract_token_from_cookie(request.headers(), &config.cookie_name))
        .ok_or_else(ApiError::unauthorized)?;

    let claims = jwt::validate_token(config, &token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized()
    })?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    for cookie_str in cookie_header.split(';') {
        if let Ok(cookie) = cookie::Cookie::parse(cookie_str.trim()) {
            if cookie.name() == cookie_name {
                return Some(cookie.value().to_string());
            }
        }
    }

    None
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}
