//! Job request, result and lifecycle types.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults and limits
// ---------------------------------------------------------------------------

/// Width applied when the request omits one.
pub const DEFAULT_WIDTH: u32 = 1280;
/// Height applied when the request omits one.
pub const DEFAULT_HEIGHT: u32 = 853;
/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 4096;
/// Artifacts produced when the request omits a count.
pub const DEFAULT_IMAGE_COUNT: u32 = 1;
/// Largest number of artifacts one job may produce.
pub const MAX_IMAGE_COUNT: u32 = 4;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything a content generator needs to perform one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub count: u32,
}

impl GenerationRequest {
    /// Build a request with defaults for every optional field.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            count: DEFAULT_IMAGE_COUNT,
        }
    }

    /// Build and validate a request from optional parameters.
    ///
    /// The prompt is kept verbatim (it becomes the result label); a missing
    /// or whitespace-only prompt is an `InvalidRequest`.
    pub fn from_parts(
        prompt: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
        count: Option<u32>,
    ) -> Result<Self, CoreError> {
        let prompt = prompt.unwrap_or_default();
        if prompt.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "Missing prompt parameter.".into(),
            ));
        }

        let request = Self {
            prompt: prompt.to_string(),
            width: width.unwrap_or(DEFAULT_WIDTH),
            height: height.unwrap_or(DEFAULT_HEIGHT),
            count: count.unwrap_or(DEFAULT_IMAGE_COUNT),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Check prompt, dimensions and count against the accepted ranges.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "Missing prompt parameter.".into(),
            ));
        }
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        if self.count == 0 || self.count > MAX_IMAGE_COUNT {
            return Err(CoreError::InvalidRequest(format!(
                "count must be between 1 and {MAX_IMAGE_COUNT}, got {}",
                self.count
            )));
        }
        Ok(())
    }
}

fn validate_dimension(name: &str, value: u32) -> Result<(), CoreError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(CoreError::InvalidRequest(format!(
            "{name} must be between 1 and {MAX_DIMENSION}, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One representation (full-size or thumbnail) of a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// A generated artifact, labelled with the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub label: String,
    pub fullsize: Rendition,
    pub thumbnail: Rendition,
}

/// The immutable output of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub label: String,
    pub images: Vec<GeneratedImage>,
}

impl JobResult {
    /// Attach the prompt label to every generated image.
    pub fn labelled(label: impl Into<String>, images: Vec<GeneratedImage>) -> Self {
        let label = label.into();
        let images = images
            .into_iter()
            .map(|image| GeneratedImage {
                label: label.clone(),
                ..image
            })
            .collect();
        Self { label, images }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Explicit job state. Only `Queued` may transition, and only once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Completed(JobResult),
    Cancelled,
    Failed(String),
}

impl JobState {
    pub fn is_queued(&self) -> bool {
        matches!(self, JobState::Queued)
    }

    /// Lowercase name as used on the wire and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Queued => "processing",
            JobState::Completed(_) => "completed",
            JobState::Cancelled => "cancelled",
            JobState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_prompt_is_invalid() {
        assert_matches!(
            GenerationRequest::from_parts(None, None, None, None),
            Err(CoreError::InvalidRequest(_))
        );
    }

    #[test]
    fn blank_prompt_is_invalid() {
        assert_matches!(
            GenerationRequest::from_parts(Some("   "), None, None, None),
            Err(CoreError::InvalidRequest(_))
        );
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let request = GenerationRequest::from_parts(Some("example.com"), None, None, None)
            .unwrap();
        assert_eq!(request.prompt, "example.com");
        assert_eq!(request.width, DEFAULT_WIDTH);
        assert_eq!(request.height, DEFAULT_HEIGHT);
        assert_eq!(request.count, DEFAULT_IMAGE_COUNT);
    }

    #[test]
    fn surrounding_whitespace_in_prompt_is_kept() {
        let request = GenerationRequest::from_parts(Some(" example.com "), None, None, None)
            .unwrap();
        assert_eq!(request.prompt, " example.com ");
    }

    #[test]
    fn explicit_dimensions_are_kept() {
        let request =
            GenerationRequest::from_parts(Some("cat"), Some(640), Some(480), Some(2)).unwrap();
        assert_eq!((request.width, request.height, request.count), (640, 480, 2));
    }

    #[test]
    fn zero_width_is_invalid() {
        assert!(GenerationRequest::from_parts(Some("cat"), Some(0), None, None).is_err());
    }

    #[test]
    fn oversized_height_is_invalid() {
        let err = GenerationRequest::from_parts(Some("cat"), None, Some(MAX_DIMENSION + 1), None)
            .unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn count_above_limit_is_invalid() {
        assert!(GenerationRequest::new("cat")
            .with_count(MAX_IMAGE_COUNT + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn labelled_result_overrides_image_labels() {
        let image = GeneratedImage {
            label: String::new(),
            fullsize: Rendition {
                width: 2,
                height: 2,
                url: "https://cdn.example/full.png".into(),
            },
            thumbnail: Rendition {
                width: 1,
                height: 1,
                url: "https://cdn.example/thumb.png".into(),
            },
        };
        let result = JobResult::labelled("example.com", vec![image.clone(), image]);
        assert_eq!(result.label, "example.com");
        assert!(result.images.iter().all(|i| i.label == "example.com"));
    }

    #[test]
    fn queued_jobs_read_as_processing() {
        assert!(JobState::Queued.is_queued());
        assert!(!JobState::Cancelled.is_queued());
        assert_eq!(JobState::Queued.name(), "processing");
        assert_eq!(JobState::Failed("boom".into()).name(), "failed");
    }
}
