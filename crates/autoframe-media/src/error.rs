//! Error types for reframing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for reframing operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while reframing a video.
///
/// Detection failures are recoverable: the pipeline degrades the affected
/// frame to zero faces and keeps going. Source, resample and sink failures
/// are fatal for the run. Track loss is a lifecycle event, not an error.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Frame source failed: {message}")]
    Source { message: String },

    #[error("Face detection failed: {0}")]
    Detection(String),

    #[error("Resampling failed at frame {frame_index}: {message}")]
    Resample { frame_index: u64, message: String },

    #[error("Frame sink failed: {message}")]
    Sink { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a frame source failure.
    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a detection failure (recoverable).
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::Detection(message.into())
    }

    /// Create a resampling failure for a specific frame.
    pub fn resample_failed(frame_index: u64, message: impl Into<String>) -> Self {
        Self::Resample {
            frame_index,
            message: message.into(),
        }
    }

    /// Create a frame sink failure.
    pub fn sink_failed(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the run can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Detection(_))
    }
}
