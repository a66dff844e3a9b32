use axum::routing::post;
use axum::Router;
use pikwy_core::protocol::routes::AUTH_STATUS;

use crate::handlers::auth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(AUTH_STATUS, post(auth::authentication_status))
}
