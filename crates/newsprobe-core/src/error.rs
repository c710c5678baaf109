//! Error types for NewsProbe

use std::path::{Path, PathBuf};

/// Result type alias using NewsProbe's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for NewsProbe operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An artifact file does not exist at its resolved path
    #[error("artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// An artifact file exists but could not be read or deserialized
    #[error("artifact corrupt: {}: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// Caller supplied unusable input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vectorizer or classifier failed while serving a prediction
    #[error("inference error: {0}")]
    Inference(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new artifact-not-found error
    pub fn artifact_not_found(path: impl AsRef<Path>) -> Self {
        Self::ArtifactNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new artifact-corrupt error
    pub fn artifact_corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the two artifact failures, which callers treat as a
    /// transient operational condition rather than a bug.
    pub fn is_artifact_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ArtifactNotFound { .. } | Self::ArtifactCorrupt { .. }
        )
    }

    /// Short, stable name of the variant, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => "artifact_not_found",
            Self::ArtifactCorrupt { .. } => "artifact_corrupt",
            Self::InvalidInput(_) => "invalid_input",
            Self::Inference(_) => "inference",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}
