//! Error handling primitives shared across the core.
//!
//! Fatal conditions travel as [`EvalError`]. Non-fatal per-pair conditions
//! (resolution gaps, similarity failures, undecodable images) are logged and
//! never surface through this type.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error codes for machine consumers of a failed run.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Configuration is missing, unparsable or inconsistent.
    Config = 1,
    /// No original images were discovered.
    NoImages = 2,
    /// A configured classifier could not be resolved or its weights are absent.
    ClassifierMissing = 3,
    /// Input failed validation (undecodable image, bad shape).
    InvalidInput = 4,
    /// A classifier failed to produce a prediction.
    Classification = 5,
    /// Filesystem failure.
    Io = 6,
    /// Catch-all for bugs.
    Internal = 7,
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("required directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no images with a recognized extension found under {}", .0.display())]
    NoImages(PathBuf),

    #[error("unknown classifier identifier '{0}'")]
    UnknownClassifier(String),

    #[error("weights for classifier '{name}' not found: {}", .path.display())]
    WeightsMissing { name: String, path: PathBuf },

    #[error("classifier '{classifier}' failed on {}: {reason}", .rel_path.display())]
    Classification {
        classifier: String,
        rel_path: PathBuf,
        reason: String,
    },

    #[error("failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Validation helper.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Configuration helper.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::Config(_) | EvalError::MissingDirectory(_) | EvalError::Yaml(_) => {
                ErrorCode::Config
            }
            EvalError::NoImages(_) => ErrorCode::NoImages,
            EvalError::UnknownClassifier(_) | EvalError::WeightsMissing { .. } => {
                ErrorCode::ClassifierMissing
            }
            EvalError::Decode { .. } | EvalError::InvalidInput(_) => ErrorCode::InvalidInput,
            EvalError::Classification { .. } => ErrorCode::Classification,
            EvalError::Io(_) => ErrorCode::Io,
            EvalError::Json(_) | EvalError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for errors raised before any pair was evaluated.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::Config | ErrorCode::NoImages | ErrorCode::ClassifierMissing
        )
    }
}
