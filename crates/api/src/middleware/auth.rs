//! Bearer-token extractor for Axum handlers.
//!
//! Tokens come from the host platform's authentication provider and are
//! opaque to this service: only their presence is checked.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use pikwy_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// The caller's bearer token, if any.
///
/// When `require_auth` is enabled, extraction fails with 401 unless the
/// request carries `Authorization: Bearer <token>` with a non-empty token.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            Ok(token) => Ok(BearerToken(Some(token.to_string()))),
            Err(e) if state.config.require_auth => Err(AppError::Core(e)),
            Err(_) => Ok(BearerToken(None)),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| {
            CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

    if token.is_empty() {
        return Err(CoreError::Unauthorized("Empty bearer token".into()));
    }
    Ok(token)
}
