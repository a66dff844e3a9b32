//! Liveness probe, mounted at the root rather than under `/api`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use pikwy_core::protocol::routes::HEALTH;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `stopping` once the runner has been told to shut down.
    pub status: &'static str,
    pub version: &'static str,
    /// Jobs not yet completed, cancelled or failed.
    pub queued_jobs: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = &state.store;
    Json(HealthResponse {
        status: if store.is_accepting() { "ok" } else { "stopping" },
        version: env!("CARGO_PKG_VERSION"),
        queued_jobs: store.queued_count(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route(HEALTH, get(health))
}
