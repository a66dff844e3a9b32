use axum::http::HeaderMap;
use axum::Json;
use pikwy_core::protocol::AuthStatusResponse;

use crate::middleware::auth::bearer_token;

/// POST /api/authentication/status
///
/// Reports whether the request carried a usable bearer token. Never fails.
pub async fn authentication_status(headers: HeaderMap) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        is_authenticated: bearer_token(&headers).is_ok(),
    })
}
