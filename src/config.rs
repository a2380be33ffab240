use crate::error::{Result, StoryboardError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(800);
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_IMAGE_BASE: &str = "https://picsum.photos";

/// 画面风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    #[default]
    Anime,
    Chinese,
    Realistic,
    Scifi,
    Watercolor,
    Sketch,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 6] = [
        ArtStyle::Anime,
        ArtStyle::Chinese,
        ArtStyle::Realistic,
        ArtStyle::Scifi,
        ArtStyle::Watercolor,
        ArtStyle::Sketch,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ArtStyle::Anime => "anime",
            ArtStyle::Chinese => "chinese",
            ArtStyle::Realistic => "realistic",
            ArtStyle::Scifi => "scifi",
            ArtStyle::Watercolor => "watercolor",
            ArtStyle::Sketch => "sketch",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArtStyle::Anime => "日漫",
            ArtStyle::Chinese => "古风",
            ArtStyle::Realistic => "写实",
            ArtStyle::Scifi => "科幻",
            ArtStyle::Watercolor => "水彩",
            ArtStyle::Sketch => "素描",
        }
    }

    /// 图片提示词前缀
    pub fn prompt_tag(self) -> &'static str {
        match self {
            ArtStyle::Anime => "anime style illustration",
            ArtStyle::Chinese => "traditional chinese painting",
            ArtStyle::Realistic => "photorealistic cinematic shot",
            ArtStyle::Scifi => "science fiction concept art",
            ArtStyle::Watercolor => "soft watercolor painting",
            ArtStyle::Sketch => "pencil sketch",
        }
    }
}

impl fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ArtStyle {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        ArtStyle::ALL
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoryboardError::InvalidSetting(format!("unknown art style '{}'", s)))
    }
}

/// 分镜帧数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct FrameCount(usize);

impl FrameCount {
    pub const MIN: usize = 2;
    pub const MAX: usize = 12;

    pub fn new(count: usize) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(StoryboardError::InvalidSetting(format!(
                "frame count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(6)
    }
}

impl TryFrom<usize> for FrameCount {
    type Error = StoryboardError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FrameCount> for usize {
    fn from(value: FrameCount) -> Self {
        value.0
    }
}

impl FromStr for FrameCount {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        let count: usize = s
            .trim()
            .parse()
            .map_err(|_| StoryboardError::InvalidSetting(format!("invalid frame count '{}'", s)))?;
        Self::new(count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1080p")]
    P1080,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
}

impl Resolution {
    pub fn id(self) -> &'static str {
        match self {
            Resolution::P1080 => "1080p",
            Resolution::P720 => "720p",
            Resolution::P480 => "480p",
        }
    }

    pub fn width(self) -> u32 {
        match self {
            Resolution::P1080 => 1920,
            Resolution::P720 => 1280,
            Resolution::P480 => 854,
        }
    }
}

impl FromStr for Resolution {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1080p" => Ok(Resolution::P1080),
            "720p" => Ok(Resolution::P720),
            "480p" => Ok(Resolution::P480),
            other => Err(StoryboardError::InvalidSetting(format!(
                "unknown resolution '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn id(self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
        }
    }

    fn ratio(self) -> (u32, u32) {
        match self {
            AspectRatio::Wide => (16, 9),
            AspectRatio::Standard => (4, 3),
            AspectRatio::Square => (1, 1),
        }
    }

    /// 按宽度计算高度（四舍五入）
    pub fn height_for(self, width: u32) -> u32 {
        let (w, h) = self.ratio();
        (width * h + w / 2) / w
    }
}

impl FromStr for AspectRatio {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Wide),
            "4:3" => Ok(AspectRatio::Standard),
            "1:1" => Ok(AspectRatio::Square),
            other => Err(StoryboardError::InvalidSetting(format!(
                "unknown aspect ratio '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(StoryboardError::InvalidSetting(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// 一次分镜生成请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    pub style: ArtStyle,
    pub frame_count: FrameCount,
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, style: ArtStyle, frame_count: FrameCount) -> Self {
        Self {
            text: text.into(),
            style,
            frame_count,
            resolution: Resolution::default(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn with_format(mut self, resolution: Resolution, aspect_ratio: AspectRatio) -> Self {
        self.resolution = resolution;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// 去除首尾空白后的文本，为空时返回 `None`
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let width = self.resolution.width();
        (width, self.aspect_ratio.height_for(width))
    }
}

/// 任务进行中再次开始生成时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    #[default]
    Reject,
    Restart,
}

impl FromStr for OverlapPolicy {
    type Err = StoryboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OverlapPolicy::Reject),
            "restart" => Ok(OverlapPolicy::Restart),
            other => Err(StoryboardError::InvalidSetting(format!(
                "unknown overlap policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub step_interval: Duration,
    pub completion_delay: Duration,
    pub overlap: OverlapPolicy,
    pub image_base: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_interval: DEFAULT_STEP_INTERVAL,
            completion_delay: DEFAULT_COMPLETION_DELAY,
            overlap: OverlapPolicy::default(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
        }
    }
}

impl EngineConfig {
    /// 从环境变量读取配置（需先加载 `.env`）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = lookup("STORYBOARD_STEP_INTERVAL_MS") {
            config.step_interval = parse_millis("STORYBOARD_STEP_INTERVAL_MS", &ms)
                .and_then(check_step_interval)
                .map_err(|e| match e {
                    StoryboardError::InvalidSetting(msg) => {
                        StoryboardError::EnvError(format!("STORYBOARD_STEP_INTERVAL_MS: {}", msg))
                    }
                    other => other,
                })?;
        }
        if let Some(ms) = lookup("STORYBOARD_COMPLETION_DELAY_MS") {
            config.completion_delay = parse_millis("STORYBOARD_COMPLETION_DELAY_MS", &ms)?;
        }
        if let Some(policy) = lookup("STORYBOARD_OVERLAP") {
            config.overlap = policy
                .parse()
                .map_err(|e| StoryboardError::EnvError(format!("STORYBOARD_OVERLAP: {}", e)))?;
        }
        if let Some(base) = lookup("STORYBOARD_IMAGE_BASE") {
            config.image_base = base;
        }

        Ok(config)
    }
}

/// 步骤间隔必须大于零
pub fn check_step_interval(interval: Duration) -> Result<Duration> {
    if interval.is_zero() {
        Err(StoryboardError::InvalidSetting(
            "step interval must be greater than zero".to_string(),
        ))
    } else {
        Ok(interval)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| StoryboardError::EnvError(format!("{} must be milliseconds, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn frame_count_is_bounded() {
        assert!(FrameCount::new(1).is_err());
        assert!(FrameCount::new(13).is_err());
        assert_eq!(FrameCount::new(12).unwrap().get(), 12);
        assert_eq!(FrameCount::default().get(), 6);
        assert!("abc".parse::<FrameCount>().is_err());
    }

    #[test]
    fn styles_parse_from_their_ids() {
        for style in ArtStyle::ALL {
            assert_eq!(style.id().parse::<ArtStyle>().unwrap(), style);
        }
        assert!("oil".parse::<ArtStyle>().is_err());
        assert_eq!(ArtStyle::Chinese.display_name(), "古风");
    }

    #[test]
    fn request_dimensions_follow_aspect_ratio() {
        let request = GenerationRequest::new("text", ArtStyle::Anime, FrameCount::default())
            .with_format(Resolution::P1080, AspectRatio::Wide);
        assert_eq!(request.dimensions(), (1920, 1080));

        let request = request.with_format(Resolution::P480, AspectRatio::Standard);
        assert_eq!(request.dimensions(), (854, 641));

        let request = request.with_format(Resolution::P720, AspectRatio::Square);
        assert_eq!(request.dimensions(), (1280, 1280));
    }

    #[test]
    fn whitespace_only_text_has_no_trimmed_text() {
        let request = GenerationRequest::new("  \n\t ", ArtStyle::Sketch, FrameCount::default());
        assert_eq!(request.trimmed_text(), None);
    }

    #[test]
    fn engine_config_reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STORYBOARD_STEP_INTERVAL_MS", "10"),
            ("STORYBOARD_OVERLAP", "restart"),
        ]);
        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.step_interval, Duration::from_millis(10));
        assert_eq!(config.completion_delay, DEFAULT_COMPLETION_DELAY);
        assert_eq!(config.overlap, OverlapPolicy::Restart);
    }

    #[test]
    fn zero_step_interval_is_rejected() {
        let result = EngineConfig::from_lookup(|k| {
            (k == "STORYBOARD_STEP_INTERVAL_MS").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(StoryboardError::EnvError(msg)) if msg.contains("greater than zero")));
        assert!(matches!(
            check_step_interval(Duration::ZERO),
            Err(StoryboardError::InvalidSetting(_))
        ));
        assert_eq!(
            check_step_interval(Duration::from_millis(1)).unwrap(),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn zero_completion_delay_is_allowed() {
        let config = EngineConfig::from_lookup(|k| {
            (k == "STORYBOARD_COMPLETION_DELAY_MS").then(|| "0".to_string())
        })
        .unwrap();
        assert_eq!(config.completion_delay, Duration::ZERO);
    }

    #[test]
    fn engine_config_rejects_garbage() {
        let result = EngineConfig::from_lookup(|k| {
            (k == "STORYBOARD_STEP_INTERVAL_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(StoryboardError::EnvError(_))));
    }
}
