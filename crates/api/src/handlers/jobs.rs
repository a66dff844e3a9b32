//! Handlers for job submission, status polling and cancellation.
//!
//! All endpoints require a bearer token (see [`BearerToken`]). Parameters
//! travel in the query string, for both GET and POST.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use pikwy_core::protocol::{CancelResponse, JobStatusResponse, QueueGenerationResponse};

use crate::error::AppResult;
use crate::middleware::auth::BearerToken;
use crate::query::{JobIdParams, SubmitParams};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// GET /api/queue-generation
///
/// Queue a generation job and return its id immediately. Returns 403 when
/// the credit balance is exhausted (checked before the prompt) and 400 for
/// a missing prompt or malformed dimensions.
pub async fn queue_generation(
    _auth: BearerToken,
    State(state): State<AppState>,
    query: Result<Query<SubmitParams>, QueryRejection>,
) -> AppResult<Json<QueueGenerationResponse>> {
    let Query(params) = query?;
    state.store.ensure_credits()?;
    let request = params.into_request()?;

    let job_id = state.store.submit(request)?;

    Ok(Json(QueueGenerationResponse { job_id }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/job-status
///
/// Report `processing`, `completed` (with images and the current balance),
/// `cancelled` or `failed`. Unknown ids are 404.
pub async fn job_status(
    _auth: BearerToken,
    State(state): State<AppState>,
    query: Result<Query<JobIdParams>, QueryRejection>,
) -> AppResult<Json<JobStatusResponse>> {
    let Query(params) = query?;
    let job_id = params.require()?;
    let status = state.store.status(job_id)?;
    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/job-status/cancel
///
/// Cancel a queued job. Jobs that are not queued any more (completed,
/// failed, already cancelled) and unknown ids are all 404.
pub async fn cancel_job(
    _auth: BearerToken,
    State(state): State<AppState>,
    query: Result<Query<JobIdParams>, QueryRejection>,
) -> AppResult<Json<CancelResponse>> {
    let Query(params) = query?;
    let job_id = params.require()?;
    state.store.cancel(job_id)?;

    Ok(Json(CancelResponse {
        message: "Job successfully cancelled.".into(),
    }))
}
