use super::FrameGenerator;
use crate::config::{ArtStyle, GenerationRequest, DEFAULT_IMAGE_BASE};
use crate::error::{Result, StoryboardError};
use crate::media::PlaceholderResolver;
use crate::scene::splitter;
use crate::scene::{SceneBoard, SceneFrame};
use tracing::info;

/// 本地切分文本，每个分镜使用占位图片
#[derive(Debug, Clone)]
pub struct MockFrameGenerator {
    image_base: String,
}

impl MockFrameGenerator {
    pub fn new(image_base: impl Into<String>) -> Self {
        Self {
            image_base: image_base.into(),
        }
    }
}

impl Default for MockFrameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE)
    }
}

fn synthetic_prompt(style: ArtStyle, segment: &str) -> String {
    format!("{}, {}", style.prompt_tag(), segment)
}

impl FrameGenerator for MockFrameGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<SceneBoard> {
        let text = request.trimmed_text().ok_or(StoryboardError::MissingInput)?;
        info!("Generating {} frames in {} style...", request.frame_count.get(), request.style);

        let (width, height) = request.dimensions();
        let resolver = PlaceholderResolver::new(&self.image_base, width, height)?;
        let segments = splitter::split(text, request.frame_count.get())?;

        let frames = segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let image_url = resolver.resolve(&segment, request.style, i)?;
                let prompt = synthetic_prompt(request.style, &segment);
                Ok(SceneFrame::new(i, image_url, segment, prompt))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Successfully generated {} frames", frames.len());
        Ok(SceneBoard::new(frames))
    }
}
