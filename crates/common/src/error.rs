//! Error types shared across pathreplay crates.

use std::path::PathBuf;

/// Top-level error type for pathreplay operations.
#[derive(Debug, thiserror::Error)]
pub enum PathreplayError {
    #[error("Screen geometry unavailable: {message}")]
    GeometryUnavailable { message: String },

    #[error("Malformed log: {message}")]
    MalformedLog { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Pointer error: {message}")]
    Pointer { message: String },

    #[error("Estimator error: {message}")]
    Estimator { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PathreplayError.
pub type PathreplayResult<T> = Result<T, PathreplayError>;

impl PathreplayError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryUnavailable {
            message: msg.into(),
        }
    }

    pub fn malformed_log(msg: impl Into<String>) -> Self {
        Self::MalformedLog {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn pointer(msg: impl Into<String>) -> Self {
        Self::Pointer {
            message: msg.into(),
        }
    }

    pub fn estimator(msg: impl Into<String>) -> Self {
        Self::Estimator {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error invalidates the whole run rather than one observation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::GeometryUnavailable { .. }
                | Self::Config { .. }
                | Self::Storage { .. }
                | Self::MalformedLog { .. }
                | Self::FileNotFound { .. }
        )
    }
}
