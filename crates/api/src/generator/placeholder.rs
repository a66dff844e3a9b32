//! Placeholder image catalog used when no real provider is configured.

use async_trait::async_trait;
use pikwy_core::job::{GeneratedImage, GenerationRequest, Rendition};

use super::{ContentGenerator, GenerationError};

const FULLSIZE_WIDTH: u32 = 1280;
const FULLSIZE_HEIGHT: u32 = 853;
const THUMBNAIL_WIDTH: u32 = 640;
const THUMBNAIL_HEIGHT: u32 = 427;

/// Image stems on the placeholder CDN; `_1280.jpg` / `_640.jpg` are appended.
const CATALOG: &[&str] = &[
    "https://cdn.pixabay.com/photo/2023/02/03/05/11/youtube-background-7764170",
    "https://cdn.pixabay.com/photo/2023/02/03/05/12/youtube-background-7764172",
    "https://cdn.pixabay.com/photo/2023/02/03/05/07/colorful-7764162",
    "https://cdn.pixabay.com/photo/2023/02/03/04/57/swirls-7764142",
];

/// Returns `count` images cycled from a fixed catalog.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderGenerator;

impl PlaceholderGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentGenerator for PlaceholderGenerator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        let images = CATALOG
            .iter()
            .cycle()
            .take(request.count as usize)
            .map(|stem| GeneratedImage {
                label: request.prompt.clone(),
                fullsize: Rendition {
                    width: FULLSIZE_WIDTH,
                    height: FULLSIZE_HEIGHT,
                    url: format!("{stem}_{FULLSIZE_WIDTH}.jpg"),
                },
                thumbnail: Rendition {
                    width: THUMBNAIL_WIDTH,
                    height: THUMBNAIL_HEIGHT,
                    url: format!("{stem}_{THUMBNAIL_WIDTH}.jpg"),
                },
            })
            .collect();
        Ok(images)
    }
}
