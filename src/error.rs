//! Error taxonomy for the inference pipeline.
//!
//! Each stage owns a precise error type ([`DecodeError`], [`PreprocessError`],
//! [`ClassifierError`], [`RankError`]); all of them are classified into one
//! [`InferenceError`] before leaving [`crate::InferenceService`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::config::ConfigError;
use crate::pipeline::decoder::DecodeError;
use crate::pipeline::preprocessor::PreprocessError;
use crate::pipeline::ranker::RankError;
use crate::pipeline::stage::Stage;

/// Stable, serializable name of an [`InferenceError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    DecodeError,
    PreprocessError,
    ModelUnavailableError,
    ClassificationError,
    BatchTooLargeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::PreprocessError => "PreprocessError",
            ErrorKind::ModelUnavailableError => "ModelUnavailableError",
            ErrorKind::ClassificationError => "ClassificationError",
            ErrorKind::BatchTooLargeError => "BatchTooLargeError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the end user should be told.
///
/// Only `UnusableImage` should prompt the user to retake or re-upload a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    UnusableImage,
    ServiceUnavailable,
    MalformedRequest,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("image could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    #[error("image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("classifier model is not loaded")]
    ModelUnavailable,

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("batch of {requested} images exceeds the limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::Decode(_) => ErrorKind::DecodeError,
            InferenceError::Preprocess(_) => ErrorKind::PreprocessError,
            InferenceError::ModelUnavailable => ErrorKind::ModelUnavailableError,
            InferenceError::Classification(_) => ErrorKind::ClassificationError,
            InferenceError::BatchTooLarge { .. } => ErrorKind::BatchTooLargeError,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::DecodeError | ErrorKind::PreprocessError => ErrorCategory::UnusableImage,
            ErrorKind::ModelUnavailableError | ErrorKind::ClassificationError => {
                ErrorCategory::ServiceUnavailable
            }
            ErrorKind::BatchTooLargeError => ErrorCategory::MalformedRequest,
        }
    }

    /// The pipeline stage the request was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            InferenceError::Decode(_) => Stage::Decoding,
            InferenceError::Preprocess(_) => Stage::Preprocessing,
            InferenceError::ModelUnavailable | InferenceError::Classification(_) => {
                Stage::Classifying
            }
            InferenceError::BatchTooLarge { .. } => Stage::Received,
        }
    }

    /// True for failures caused by the submitted input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, InferenceError::Decode(_) | InferenceError::BatchTooLarge { .. })
    }
}

impl From<ClassifierError> for InferenceError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::Unavailable
            | ClassifierError::Load { .. }
            | ClassifierError::Invalid(_) => InferenceError::ModelUnavailable,
            ClassifierError::Inference(msg) => InferenceError::Classification(msg),
        }
    }
}

impl From<RankError> for InferenceError {
    fn from(e: RankError) -> Self {
        InferenceError::Classification(e.to_string())
    }
}

/// Fatal problems detected while assembling the service at process start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("class catalog has {catalog} entries but the model produces {model} scores")]
    CatalogMismatch { catalog: usize, model: usize },

    #[error("target size yields {expected} input values but the model expects {model}")]
    InputMismatch { expected: usize, model: usize },

    #[error("could not build batch worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
