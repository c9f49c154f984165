use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::ranker::ClassScores;
use crate::pipeline::tensor::PreprocessedTensor;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier model is not loaded")]
    Unavailable,

    #[error("could not load model from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model is not usable: {0}")]
    Invalid(String),

    #[error("{0}")]
    Inference(String),
}

/// Static description of a loaded model, for readiness/info endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Per-sample input shape, batch dimension omitted.
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
    pub total_params: usize,
    pub description: Option<String>,
    /// Labels the artifact declares for its outputs, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_labels: Option<Vec<String>>,
}

/// "Given a tensor, return per-class scores."
///
/// Implementations are loaded once at startup and shared read-only between
/// request threads. A backend that cannot run concurrently must serialize
/// `score` internally.
pub trait ClassifierPort: Send + Sync {
    /// Whether a model is loaded. Never runs inference.
    fn is_loaded(&self) -> bool;

    /// Number of scores produced per sample, when known.
    fn output_width(&self) -> Option<usize>;

    /// Number of input values expected per sample, when known.
    fn input_len(&self) -> Option<usize> {
        None
    }

    fn info(&self) -> Option<ModelInfo> {
        None
    }

    /// Scores every batch row of `tensor`, in row order.
    ///
    /// Fails with [`ClassifierError::Unavailable`] when no model is loaded.
    fn score(&self, tensor: &PreprocessedTensor) -> Result<Vec<ClassScores>, ClassifierError>;
}
