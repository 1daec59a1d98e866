//! Error types for the NeoKrishi advisory service

use thiserror::Error;

/// Result type alias for advisory and classification operations
pub type Result<T> = std::result::Result<T, AgriError>;

/// Main error type for the NeoKrishi core
#[derive(Error, Debug)]
pub enum AgriError {
    /// The uploaded bytes could not be turned into a tensor.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The classifier failed or returned an unusable score vector.
    #[error("Inference error: {0}")]
    Inference(String),

    /// No prediction within the per-request deadline, queueing included.
    #[error("Inference timed out after {0} seconds")]
    InferenceTimeout(u64),

    /// A request field is missing, malformed or out of range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Startup-time defect: unreadable artifact, label/model mismatch, bad tables.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgriError {
    /// Shorthand for a field-level validation failure.
    pub fn invalid_field(field: &str, reason: impl std::fmt::Display) -> Self {
        AgriError::Validation(format!("{field}: {reason}"))
    }
}

impl From<image::ImageError> for AgriError {
    fn from(err: image::ImageError) -> Self {
        AgriError::InvalidImage(err.to_string())
    }
}
