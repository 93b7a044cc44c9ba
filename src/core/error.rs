use crate::core::types::Skill;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the remote service, before any tagged result exists.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

/// Everything a node invocation can fail with.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("{skill} skill failed: {message}")]
    Skill { skill: Skill, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("image conversion error: {0}")]
    Image(String),

    #[error("task did not complete within {limit:?}")]
    Timeout { limit: Duration },

    #[error("task was cancelled before completion")]
    Cancelled,

    #[error("task bridge error: {0}")]
    Bridge(String),
}

impl From<image::ImageError> for NodeError {
    fn from(err: image::ImageError) -> Self {
        NodeError::Image(err.to_string())
    }
}

impl NodeError {
    /// True for errors raised locally before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(self, NodeError::Validation(_))
    }
}
