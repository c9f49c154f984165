pub mod advice;
pub mod canonical;
pub mod catalog;
pub mod decoder;
pub mod input;
pub mod preprocessor;
pub mod ranker;
pub mod result;
pub mod service;
pub mod stage;
pub mod status;
pub mod tensor;

pub use advice::{DiseaseInfo, Severity};
pub use canonical::CanonicalImage;
pub use catalog::{CatalogError, ClassCatalog};
pub use decoder::{DecodeError, DecodeLimits, ImageDecoder};
pub use input::RawImageInput;
pub use preprocessor::{PreprocessError, TargetSize};
pub use ranker::{ClassScores, RankedClass, Ranking};
pub use result::{BatchItem, BatchPredictionResult, FailureRecord, PredictionResult};
pub use service::InferenceService;
pub use stage::{RequestState, Stage};
pub use tensor::PreprocessedTensor;
