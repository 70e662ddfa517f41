//! Error types shared across Vertcut crates.

use std::path::PathBuf;

/// Top-level error type for Vertcut operations.
#[derive(Debug, thiserror::Error)]
pub enum VertcutError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Compile error: {message}")]
    Compile { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VertcutError.
pub type VertcutResult<T> = Result<T, VertcutError>;

impl VertcutError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::JobNotFound { id: id.into() }
    }

    /// Whether this error denotes bad caller input rather than an
    /// internal failure. Unreadable media counts: a probe failure means
    /// the uploaded file is not something ffmpeg can decode.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Probe { .. }
                | Self::FileNotFound { .. }
                | Self::Unsupported { .. }
        )
    }
}
