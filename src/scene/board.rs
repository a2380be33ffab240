use super::SceneFrame;
use crate::error::{Result, StoryboardError};
use tracing::{debug, info};

/// 生成后的分镜列表，可在内存中调整顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneBoard {
    frames: Vec<SceneFrame>,
}

impl SceneBoard {
    pub fn new(frames: Vec<SceneFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[SceneFrame] {
        &self.frames
    }

    /// 可修改分镜内容，不能增删
    pub fn frames_mut(&mut self) -> &mut [SceneFrame] {
        &mut self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn position(&self, id: usize) -> Result<usize> {
        self.frames
            .iter()
            .position(|frame| frame.id == id)
            .ok_or(StoryboardError::FrameNotFound(id))
    }

    /// 交换拖动的分镜与目标分镜的位置，序号不变
    pub fn move_frame(&mut self, dragged_id: usize, target_id: usize) -> Result<()> {
        if dragged_id == target_id {
            return Ok(());
        }
        let dragged = self.position(dragged_id)?;
        let target = self.position(target_id)?;
        self.frames.swap(dragged, target);
        debug!("Swapped frame {} (pos {}) with frame {} (pos {})", dragged_id, dragged, target_id, target);
        Ok(())
    }

    /// `confirm` 同意后删除最后一个分镜
    pub fn remove_last(&mut self, confirm: impl FnOnce(&SceneFrame) -> bool) -> Option<SceneFrame> {
        let last = self.frames.last()?;
        if !confirm(last) {
            return None;
        }
        let removed = self.frames.pop();
        if let Some(frame) = &removed {
            info!("Removed frame {}, {} left", frame.id, self.frames.len());
        }
        removed
    }

    /// 预览和导出前检查是否已生成分镜
    pub fn ensure_generated(&self) -> Result<()> {
        if self.frames.is_empty() {
            Err(StoryboardError::NoFrames)
        } else {
            Ok(())
        }
    }
}
