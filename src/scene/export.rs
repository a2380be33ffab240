use super::{SceneBoard, SceneFrame};
use crate::config::{AspectRatio, ArtStyle, ExportFormat, GenerationRequest, Resolution};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 导出的分镜清单（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardExport {
    pub format: ExportFormat,
    pub style: ArtStyle,
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
    pub frames: Vec<SceneFrame>,
}

impl StoryboardExport {
    pub fn new(request: &GenerationRequest, board: &SceneBoard, format: ExportFormat) -> Result<Self> {
        board.ensure_generated()?;
        Ok(Self {
            format,
            style: request.style,
            resolution: request.resolution,
            aspect_ratio: request.aspect_ratio,
            frames: board.frames().to_vec(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.to_json()?).await?;
        info!("Storyboard exported to: {}", path.display());
        Ok(())
    }
}
