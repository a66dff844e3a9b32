//! HTTP polling protocol: route paths and JSON payloads.
//!
//! Both the server handlers and the poller client serialize through these
//! types, so the wire format is defined in exactly one place.

use serde::{Deserialize, Serialize};

use crate::job::{GeneratedImage, JobResult, JobState};
use crate::types::JobId;

/// Route paths. Everything except `HEALTH` is nested under [`routes::API_PREFIX`].
pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const API_PREFIX: &str = "/api";
    pub const CREDITS: &str = "/credits";
    pub const PURCHASE_CREDITS: &str = "/purchase-credits";
    pub const QUEUE_GENERATION: &str = "/queue-generation";
    pub const JOB_STATUS: &str = "/job-status";
    pub const CANCEL_JOB: &str = "/job-status/cancel";
    pub const AUTH_STATUS: &str = "/authentication/status";
}

/// Query parameter names.
pub mod params {
    pub const PROMPT: &str = "prompt";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const COUNT: &str = "count";
    pub const JOB_ID: &str = "jobId";
}

/// `{ "credits": n }` returned by the credit endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsResponse {
    pub credits: i64,
}

/// `{ "jobId": "..." }` returned by submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueGenerationResponse {
    #[serde(rename = "jobId")]
    pub job_id: JobId,
}

/// Status payload, discriminated by the `status` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatusResponse {
    Completed {
        images: Vec<GeneratedImage>,
        credits: i64,
    },
    Processing,
    Cancelled,
    Failed {
        error: String,
    },
}

impl JobStatusResponse {
    /// Render a job state, attaching the current balance to completions.
    pub fn from_state(state: &JobState, credits: i64) -> Self {
        match state {
            JobState::Queued => JobStatusResponse::Processing,
            JobState::Completed(JobResult { images, .. }) => JobStatusResponse::Completed {
                images: images.clone(),
                credits,
            },
            JobState::Cancelled => JobStatusResponse::Cancelled,
            JobState::Failed(reason) => JobStatusResponse::Failed {
                error: reason.clone(),
            },
        }
    }
}

/// Acknowledgement body for a successful cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    pub message: String,
}

/// `{ "isAuthenticated": bool }` returned by the auth status probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

/// Error body produced by the server for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}
