//! Screenshot-service adapter.
//!
//! Treats the prompt as a page URL (a bare hostname gets `https://`) and
//! returns a single capture of it from the screenshot service: the
//! full-size image at the requested dimensions and a half-size thumbnail.
//! A page has one capture, so requests for more than one image fail.

use async_trait::async_trait;
use pikwy_core::job::{GeneratedImage, GenerationRequest, Rendition};
use reqwest::Url;

use super::{ContentGenerator, GenerationError};

/// Builds screenshot locators against a configured service base URL.
#[derive(Debug, Clone)]
pub struct ScreenshotGenerator {
    base_url: Url,
}

impl ScreenshotGenerator {
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            GenerationError::Configuration(format!("screenshot base URL '{base_url}': {e}"))
        })?;
        Ok(Self { base_url })
    }

    fn locator(&self, target: &Url, width: u32, height: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("url", target.as_str())
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string());
        url
    }
}

/// Parse the prompt as an http(s) page address.
fn parse_target(prompt: &str) -> Result<Url, GenerationError> {
    let prompt = prompt.trim();
    let candidate = if prompt.contains("://") {
        prompt.to_string()
    } else {
        format!("https://{prompt}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| GenerationError::InvalidTarget(format!("'{prompt}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GenerationError::InvalidTarget(format!(
            "'{prompt}': only http and https pages can be captured"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(GenerationError::InvalidTarget(format!(
            "'{prompt}': missing host"
        )));
    }
    Ok(url)
}

#[async_trait]
impl ContentGenerator for ScreenshotGenerator {
    fn name(&self) -> &'static str {
        "screenshot"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        if request.count > 1 {
            return Err(GenerationError::InvalidTarget(format!(
                "a page has a single capture, {} images requested",
                request.count
            )));
        }

        let target = parse_target(&request.prompt)?;
        let thumb_width = (request.width / 2).max(1);
        let thumb_height = (request.height / 2).max(1);

        let image = GeneratedImage {
            label: request.prompt.clone(),
            fullsize: Rendition {
                width: request.width,
                height: request.height,
                url: self.locator(&target, request.width, request.height).into(),
            },
            thumbnail: Rendition {
                width: thumb_width,
                height: thumb_height,
                url: self.locator(&target, thumb_width, thumb_height).into(),
            },
        };

        Ok(vec![image])
    }
}
