mod board;
mod export;
pub mod splitter;

pub use board::SceneBoard;
pub use export::StoryboardExport;

use serde::{Deserialize, Serialize};

/// 表示一个分镜画面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneFrame {
    /// 生成时的序号，重新排序后保持不变
    pub id: usize,
    /// 占位图片地址
    pub image_url: String,
    /// 对应的文本片段
    pub description: String,
    /// 合成的图片提示词
    pub prompt: String,
}

impl SceneFrame {
    pub fn new(id: usize, image_url: String, description: String, prompt: String) -> Self {
        Self {
            id,
            image_url,
            description,
            prompt,
        }
    }
}
