use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("canvas unavailable: {0}")]
    CanvasUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
