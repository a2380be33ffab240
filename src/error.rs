use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("segment count must be at least 1")]
    ZeroCount,

    #[error("input text is empty")]
    EmptyText,

    #[error("text is too short to split into paragraphs ({0} found)")]
    TooShort(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("invalid placeholder base URL '{0}'")]
    InvalidBase(String),

    #[error("placeholder base URL '{0}' cannot carry path segments")]
    CannotBeABase(String),
}

#[derive(Error, Debug)]
pub enum StoryboardError {
    #[error("please enter some text first")]
    MissingInput,

    #[error("a generation job is already running")]
    AlreadyGenerating,

    #[error("generation was cancelled")]
    Cancelled,

    #[error("invalid progress script: {0}")]
    InvalidScript(String),

    #[error("no frame with id {0}")]
    FrameNotFound(usize),

    #[error("no frames generated yet")]
    NoFrames,

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("generation error: {0}")]
    GenerationError(String),

    #[error("split error: {0}")]
    Split(#[from] SplitError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

pub type Result<T> = std::result::Result<T, StoryboardError>;
