use pikwy_core::protocol::ErrorBody;

/// Errors from the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        /// `error` field of the JSON body, or the raw body text.
        message: String,
    },

    /// No bearer token could be obtained.
    #[error("Authentication token unavailable: {0}")]
    Token(String),
}

impl BackendError {
    /// Build a status error from a response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|parsed| parsed.error)
            .unwrap_or_else(|_| body.to_string());
        BackendError::Status { status, message }
    }

    /// The HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Request(e) => e.status().map(|s| s.as_u16()),
            BackendError::Token(_) => None,
        }
    }
}

/// Errors surfaced by [`JobPoller`](crate::poller::JobPoller).
///
/// Cancelled and unknown jobs both surface as [`PollError::JobNotFound`];
/// callers cannot tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Not enough credits to generate content.")]
    InsufficientCredits,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to queue generation job.")]
    Submit(#[source] BackendError),

    #[error("Job not found")]
    JobNotFound,

    #[error("Content generation failed: {0}")]
    GenerationFailed(String),

    #[error("Maximum polling attempts reached ({attempts})")]
    Timeout { attempts: u32 },

    #[error("Polling was cancelled")]
    Cancelled,

    #[error("Failed to cancel job.")]
    CancelFailed(#[source] BackendError),

    #[error("Error while polling job status")]
    Polling(#[source] BackendError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PollError {
    /// Classify a failed submission.
    pub fn from_submit(err: BackendError) -> Self {
        match &err {
            BackendError::Status { status: 403, .. } => PollError::InsufficientCredits,
            BackendError::Status {
                status: 400,
                message,
            } => PollError::InvalidRequest(message.clone()),
            _ => PollError::Submit(err),
        }
    }
}
