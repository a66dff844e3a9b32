//! Query parameter types for the job endpoints.
//!
//! Every field is an optional string so a missing or malformed value becomes
//! an `INVALID_REQUEST` error with a readable message. Only structurally
//! broken query strings (a repeated key) are left to the extractor, and those
//! surface as `AppError::Query`.

use pikwy_core::error::CoreError;
use pikwy_core::job::GenerationRequest;
use serde::Deserialize;

/// `?prompt=&width=&height=&count=` for job submission.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitParams {
    pub prompt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub count: Option<String>,
}

impl SubmitParams {
    /// Parse and validate into a [`GenerationRequest`].
    pub fn into_request(self) -> Result<GenerationRequest, CoreError> {
        let width = parse_optional_u32("width", self.width.as_deref())?;
        let height = parse_optional_u32("height", self.height.as_deref())?;
        let count = parse_optional_u32("count", self.count.as_deref())?;
        GenerationRequest::from_parts(self.prompt.as_deref(), width, height, count)
    }
}

/// `?jobId=` for status and cancel.
#[derive(Debug, Default, Deserialize)]
pub struct JobIdParams {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

impl JobIdParams {
    /// The job id exactly as sent, or `InvalidRequest` when absent or empty.
    pub fn require(&self) -> Result<&str, CoreError> {
        match self.job_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(CoreError::InvalidRequest("Missing jobId parameter.".into())),
        }
    }
}

/// Blank values count as absent.
fn parse_optional_u32(name: &str, raw: Option<&str>) -> Result<Option<u32>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            CoreError::InvalidRequest(format!("{name} must be a positive integer, got '{value}'"))
        }),
    }
}
