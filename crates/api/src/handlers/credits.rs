//! Handlers for the credit balance.

use axum::extract::State;
use axum::Json;
use pikwy_core::protocol::CreditsResponse;

use crate::error::AppResult;
use crate::middleware::auth::BearerToken;
use crate::state::AppState;

/// GET /api/credits
pub async fn get_credits(
    _auth: BearerToken,
    State(state): State<AppState>,
) -> AppResult<Json<CreditsResponse>> {
    Ok(Json(CreditsResponse {
        credits: state.store.credits(),
    }))
}

/// POST /api/purchase-credits
///
/// Adds one fixed-size bundle and returns the new balance.
pub async fn purchase_credits(
    _auth: BearerToken,
    State(state): State<AppState>,
) -> AppResult<Json<CreditsResponse>> {
    let credits = state.store.purchase_credits();
    Ok(Json(CreditsResponse { credits }))
}
