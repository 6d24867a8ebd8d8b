//! Error types for encoding, model evaluation and prediction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// No symptom identifiers were supplied.
    #[error("no symptoms were selected")]
    NoSymptoms,
}

/// Errors raised while loading or evaluating a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON for any known shape.
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact parsed but its parts do not fit together.
    #[error("invalid model artifact: {reason}")]
    InvalidArtifact { reason: String },

    /// An input vector has the wrong number of features.
    #[error("feature vector has {actual} features, model expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Evaluation produced NaN or infinite probabilities.
    #[error("model produced non-finite probabilities")]
    NonFiniteOutput,
}

impl ModelError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            reason: reason.into(),
        }
    }

    /// Whether the error comes from a missing artifact file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Errors raised while ranking class probabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("{labels} class labels but {probabilities} probabilities")]
    LengthMismatch { labels: usize, probabilities: usize },
}

/// Errors surfaced by [`crate::DiagnosisService`].
#[derive(Debug, Error)]
pub enum PredictError {
    /// The request carried no symptoms.
    #[error("no symptoms were selected")]
    NoSymptoms,

    /// No model bundle was loaded at startup.
    #[error("model is not loaded")]
    ModelUnavailable,

    /// Scaling or inference failed.
    #[error("model evaluation failed: {0}")]
    Model(#[from] ModelError),

    /// Ranking failed.
    #[error("ranking failed: {0}")]
    Rank(#[from] RankError),
}

impl From<EncodeError> for PredictError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::NoSymptoms => Self::NoSymptoms,
        }
    }
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
