mod session;

pub use session::GenerationSession;

use crate::error::{Result, StoryboardError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub percent: u8,
    pub message: String,
}

impl ProgressStep {
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
        }
    }
}

/// 生成进度快照，`stage` 为已完成的步骤数
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub percent: u8,
    pub message: String,
    pub stage: usize,
}

impl ProgressState {
    pub fn is_finished(&self) -> bool {
        self.percent == 100
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Generating { stage: usize },
    Complete,
    Failed(String),
}

/// 固定的进度步骤序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressScript {
    steps: Vec<ProgressStep>,
}

impl ProgressScript {
    /// 步骤不能为空，必须严格递增并以 100 结束
    pub fn new(steps: Vec<ProgressStep>) -> Result<Self> {
        let last = steps
            .last()
            .ok_or_else(|| StoryboardError::InvalidScript("no steps".to_string()))?;
        if last.percent != 100 {
            return Err(StoryboardError::InvalidScript(format!(
                "last step must reach 100, got {}",
                last.percent
            )));
        }
        if let Some(pair) = steps.windows(2).find(|w| w[0].percent >= w[1].percent) {
            return Err(StoryboardError::InvalidScript(format!(
                "steps must increase, {} is followed by {}",
                pair[0].percent, pair[1].percent
            )));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ProgressStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 任务开始时的状态：0%，显示第一条提示
    pub fn initial_state(&self) -> ProgressState {
        ProgressState {
            percent: 0,
            message: self.steps[0].message.clone(),
            stage: 0,
        }
    }

    fn state_after(&self, index: usize) -> ProgressState {
        let step = &self.steps[index];
        ProgressState {
            percent: step.percent,
            message: step.message.clone(),
            stage: index + 1,
        }
    }
}

impl Default for ProgressScript {
    fn default() -> Self {
        Self {
            steps: vec![
                ProgressStep::new(20, "Analyzing text content..."),
                ProgressStep::new(40, "Extracting key elements..."),
                ProgressStep::new(60, "Composing frames..."),
                ProgressStep::new(80, "Rendering storyboard frames..."),
                ProgressStep::new(100, "Generation complete!"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_script_is_valid() {
        let script = ProgressScript::default();
        assert_eq!(ProgressScript::new(script.steps().to_vec()).unwrap(), script);
        assert_eq!(script.initial_state().percent, 0);
        assert_eq!(script.initial_state().message, "Analyzing text content...");
    }

    #[test]
    fn script_validation() {
        assert!(ProgressScript::new(vec![]).is_err());
        assert!(ProgressScript::new(vec![ProgressStep::new(50, "half")]).is_err());
        assert!(ProgressScript::new(vec![
            ProgressStep::new(60, "a"),
            ProgressStep::new(60, "b"),
            ProgressStep::new(100, "c"),
        ])
        .is_err());
        assert!(ProgressScript::new(vec![ProgressStep::new(100, "done")]).is_ok());
    }

    #[test]
    fn state_after_counts_applied_steps() {
        let script = ProgressScript::default();
        let last = script.state_after(script.len() - 1);
        assert_eq!(last.stage, 5);
        assert!(last.is_finished());
    }
}
