//! Content generation adapters.
//!
//! The job runner only sees the [`ContentGenerator`] trait: an async function
//! from a request to a list of generated images. Concrete adapters are chosen
//! at startup from [`GeneratorKind`].

pub mod placeholder;
pub mod screenshot;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pikwy_core::job::{GeneratedImage, GenerationRequest};

use crate::config::GeneratorKind;

pub use placeholder::PlaceholderGenerator;
pub use screenshot::ScreenshotGenerator;

/// Errors raised by a content generator.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The prompt cannot be turned into a generation target.
    #[error("Invalid generation target: {0}")]
    InvalidTarget(String),

    /// The adapter was configured with unusable settings.
    #[error("Invalid generator configuration: {0}")]
    Configuration(String),

    /// The adapter did not answer within the configured timeout.
    #[error("Content generation timed out after {0:?}")]
    TimedOut(Duration),
}

/// An opaque asynchronous content-generation function.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short adapter name used in logs.
    fn name(&self) -> &'static str;

    /// Produce the images for one request. Labels are attached by the caller.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, GenerationError>;
}

/// Build the configured generator.
pub fn from_kind(kind: &GeneratorKind) -> Result<Arc<dyn ContentGenerator>, GenerationError> {
    Ok(match kind {
        GeneratorKind::Placeholder => Arc::new(PlaceholderGenerator::new()),
        GeneratorKind::Screenshot { base_url } => Arc::new(ScreenshotGenerator::new(base_url)?),
    })
}
