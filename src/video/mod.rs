mod plan;

pub use plan::{speed_label, BackgroundMusic, VideoClip, VideoPlan, VideoSettings, Voice};
