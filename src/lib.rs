pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod pipeline;
pub mod classifier;
pub mod config;
pub mod error;
pub mod telemetry;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{InputType, ModelMetadata, Network, NetworkSpec};
pub use classifier::{ClassifierError, ClassifierPort, ModelInfo, NetworkClassifier};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCategory, ErrorKind, InferenceError, StartupError};
pub use pipeline::{
    BatchItem, BatchPredictionResult, ClassCatalog, ClassScores, FailureRecord, InferenceService,
    PredictionResult, PreprocessedTensor, RawImageInput, TargetSize,
};
