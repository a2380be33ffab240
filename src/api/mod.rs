mod mock;

pub use mock::MockFrameGenerator;

use crate::config::GenerationRequest;
use crate::error::Result;
use crate::scene::SceneBoard;

/// 根据请求生成分镜的后端
///
/// 进度步骤结束后由会话调用一次。接入真实 AI 服务时替换
/// [`MockFrameGenerator`] 即可，无需改动会话状态机。
pub trait FrameGenerator: Send + Sync + 'static {
    fn generate(&self, request: &GenerationRequest) -> Result<SceneBoard>;
}
