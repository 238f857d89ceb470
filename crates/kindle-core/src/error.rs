//! Error types for Kindle

use thiserror::Error;

/// The main error type for Kindle operations
#[derive(Debug, Error)]
pub enum KindleError {
    #[error("Unsupported pool factory: {0}")]
    UnsupportedFactory(String),

    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    #[error("Scene parse error: {0}")]
    SceneParse(String),

    #[error("Unknown scene format: {0}")]
    UnknownSceneFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Kindle operations
pub type Result<T> = std::result::Result<T, KindleError>;

impl From<toml::de::Error> for KindleError {
    fn from(err: toml::de::Error) -> Self {
        KindleError::SceneParse(err.to_string())
    }
}

impl From<serde_json::Error> for KindleError {
    fn from(err: serde_json::Error) -> Self {
        KindleError::SceneParse(err.to_string())
    }
}
