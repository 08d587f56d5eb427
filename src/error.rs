//! Error types for credential parsing and model training

use thiserror::Error;

/// Errors surfaced by the detector library
#[derive(Debug, Error, PartialEq)]
pub enum DetectorError {
    /// A credential field holds a value that cannot be read as its expected type
    #[error("malformed credential field `{field}`: {reason}")]
    MalformedField { field: String, reason: String },

    /// Training data and labels have different lengths
    #[error("training data has {credentials} credentials but {labels} labels")]
    LengthMismatch { credentials: usize, labels: usize },

    /// Training was requested with no samples
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// A training label is neither 0 nor 1
    #[error("label {label} at index {index} is not binary")]
    NonBinaryLabel { index: usize, label: u8 },

    /// Too few samples to hold out a validation split and still train
    #[error("{samples} sample(s) cannot be split into training and validation sets")]
    InsufficientSamples { samples: usize },

    /// Training diverged; the model was restored to its state before the call
    #[error("training diverged in epoch {epoch}: loss or weights are no longer finite")]
    NonFiniteLoss { epoch: usize },
}

impl DetectorError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, DetectorError>;
