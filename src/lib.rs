//! 文本生成分镜：切分文本、模拟生成进度、编辑生成结果

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod media;
pub mod scene;
pub mod video;

pub use api::{FrameGenerator, MockFrameGenerator};
pub use config::{AspectRatio, ArtStyle, EngineConfig, ExportFormat, FrameCount, GenerationRequest, OverlapPolicy, Resolution};
pub use engine::{GenerationSession, ProgressScript, ProgressState, ProgressStep, SessionPhase};
pub use error::{MediaError, Result, SplitError, StoryboardError};
pub use media::{HttpImageProbe, ImageProbe, PlaceholderResolver};
pub use scene::{SceneBoard, SceneFrame, StoryboardExport};
