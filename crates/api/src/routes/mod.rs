pub mod auth;
pub mod credits;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /credits                    get balance (GET)
/// /purchase-credits           add one bundle (POST)
/// /queue-generation           submit a job (GET)
/// /job-status                 poll a job (GET)
/// /job-status/cancel          cancel a queued job (POST)
/// /authentication/status      bearer token probe (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(credits::router())
        .merge(jobs::router())
        .merge(auth::router())
}
