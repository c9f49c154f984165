mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from leafscan for tests
pub use leafscan::{
    BatchItem, ClassifierError, ClassifierPort, ErrorKind, InferenceError, InferenceService,
    NetworkClassifier, NetworkSpec, PreprocessedTensor, RawImageInput, ServiceConfig,
    StartupError, TargetSize,
};
