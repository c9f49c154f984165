pub mod network_classifier;
pub mod port;

pub use network_classifier::NetworkClassifier;
pub use port::{ClassifierError, ClassifierPort, ModelInfo};
