use axum::routing::{get, post};
use axum::Router;
use pikwy_core::protocol::routes::{CREDITS, PURCHASE_CREDITS};

use crate::handlers::credits;
use crate::state::AppState;

/// Credit balance routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(CREDITS, get(credits::get_credits))
        .route(PURCHASE_CREDITS, post(credits::purchase_credits))
}
