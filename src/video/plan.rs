use crate::error::{Result, StoryboardError};
use crate::scene::splitter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

const SPEED_LABELS: [(f32, &str); 6] = [
    (0.5, "slow"),
    (0.75, "slower"),
    (1.0, "normal"),
    (1.25, "faster"),
    (1.5, "fast"),
    (2.0, "very fast"),
];

/// 语速名称，没有对应名称时为 `"{speed}x"`
pub fn speed_label(speed: f32) -> String {
    SPEED_LABELS
        .iter()
        .find(|(value, _)| (value - speed).abs() < f32::EPSILON)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("{}x", speed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Voice {
    #[default]
    DeepMale,
    GentleFemale,
    Child,
}

impl FromStr for Voice {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "deep-male" => Ok(Voice::DeepMale),
            "gentle-female" => Ok(Voice::GentleFemale),
            "child" => Ok(Voice::Child),
            other => Err(StoryboardError::InvalidSetting(format!("unknown voice '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundMusic {
    #[default]
    WarmPiano,
    UpbeatPop,
    ClassicalOrchestra,
    NatureSounds,
}

impl FromStr for BackgroundMusic {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "warm-piano" => Ok(BackgroundMusic::WarmPiano),
            "upbeat-pop" => Ok(BackgroundMusic::UpbeatPop),
            "classical-orchestra" => Ok(BackgroundMusic::ClassicalOrchestra),
            "nature-sounds" => Ok(BackgroundMusic::NatureSounds),
            other => Err(StoryboardError::InvalidSetting(format!("unknown music '{}'", other))),
        }
    }
}

/// 图文转视频参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub voice: Voice,
    pub music: BackgroundMusic,
    pub seconds_per_frame: u8,
    pub speech_speed: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            music: BackgroundMusic::default(),
            seconds_per_frame: 3,
            speech_speed: 1.0,
        }
    }
}

impl VideoSettings {
    pub fn new(voice: Voice, music: BackgroundMusic, seconds_per_frame: u8, speech_speed: f32) -> Result<Self> {
        if !(1..=10).contains(&seconds_per_frame) {
            return Err(StoryboardError::InvalidSetting(format!(
                "seconds per frame must be between 1 and 10, got {}",
                seconds_per_frame
            )));
        }
        if !(0.5..=2.0).contains(&speech_speed) {
            return Err(StoryboardError::InvalidSetting(format!(
                "speech speed must be between 0.5 and 2.0, got {}",
                speech_speed
            )));
        }
        Ok(Self {
            voice,
            music,
            seconds_per_frame,
            speech_speed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoClip {
    pub index: usize,
    pub text: String,
    /// 起始时间（秒）
    pub start: f64,
    /// 时长（秒）
    pub duration: f64,
}

impl VideoClip {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// 视频片段时间线，每段文本一个片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPlan {
    pub settings: VideoSettings,
    pub clips: Vec<VideoClip>,
}

impl VideoPlan {
    pub fn build(text: &str, settings: VideoSettings) -> Result<Self> {
        let paragraphs = splitter::split_paragraphs(text)?;
        let duration = f64::from(settings.seconds_per_frame);

        let clips: Vec<VideoClip> = paragraphs
            .into_iter()
            .enumerate()
            .map(|(index, text)| VideoClip {
                index,
                text,
                start: index as f64 * duration,
                duration,
            })
            .collect();

        info!("Planned {} clips, {:.1}s total", clips.len(), clips.len() as f64 * duration);
        Ok(Self { settings, clips })
    }

    pub fn total_duration(&self) -> f64 {
        self.clips.last().map(VideoClip::end).unwrap_or(0.0)
    }
}
