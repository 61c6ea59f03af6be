//! Error types
//!
//! Every failure in the upload pipeline is reported as a [`TaskgenError`].
//! Remote failures (image source, Task API, signed URL target) are kept apart
//! from local ones so the CLI can report them with distinct exit codes.

use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum TaskgenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Image download failed: {0}")]
    Download(String),

    #[error("Signed URL request failed: {0}")]
    SignedUrl(String),

    #[error("Task API request failed: {0}")]
    TaskApi(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for taskgen operations
pub type TaskgenResult<T> = Result<T, TaskgenError>;

impl TaskgenError {
    /// Wrap a connection-level failure (DNS, TLS, timeout, reset) with a message
    /// naming the step that was being performed.
    pub fn transport(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        TaskgenError::Transport {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Whether the failure originated from a remote service rather than local
    /// configuration, input or filesystem.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            TaskgenError::Download(_)
                | TaskgenError::SignedUrl(_)
                | TaskgenError::TaskApi(_)
                | TaskgenError::Upload(_)
                | TaskgenError::Transport { .. }
        )
    }
}

impl From<ValidationErrors> for TaskgenError {
    fn from(errors: ValidationErrors) -> Self {
        TaskgenError::Validation(errors.to_string())
    }
}
