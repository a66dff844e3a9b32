//! Route definitions for the job polling protocol.

use axum::routing::{get, post};
use axum::Router;
use pikwy_core::protocol::routes::{CANCEL_JOB, JOB_STATUS, QUEUE_GENERATION};

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// GET    /queue-generation     -> queue_generation
/// GET    /job-status           -> job_status
/// POST   /job-status/cancel    -> cancel_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(QUEUE_GENERATION, get(jobs::queue_generation))
        .route(JOB_STATUS, get(jobs::job_status))
        .route(CANCEL_JOB, post(jobs::cancel_job))
}
