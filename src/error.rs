//! Error types for glucosim

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlucosimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl GlucosimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GlucosimError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GlucosimError>;
