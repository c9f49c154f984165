use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{error, info};

use crate::classifier::port::{ClassifierError, ClassifierPort, ModelInfo};
use crate::network::{InputType, ModelMetadata, Network};
use crate::pipeline::ranker::ClassScores;
use crate::pipeline::tensor::PreprocessedTensor;

/// [`ClassifierPort`] backed by a dense [`Network`] stored as a JSON artifact.
///
/// The network sits in a write-once slot: it is filled at most once (normally
/// at process start) and only read afterwards. `Network::forward` takes
/// `&self`, so concurrent `score` calls need no lock.
#[derive(Debug)]
pub struct NetworkClassifier {
    artifact: PathBuf,
    slot: OnceLock<Network>,
}

impl NetworkClassifier {
    /// An unloaded classifier for `artifact`. Call [`load`](Self::load) to fill it.
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        NetworkClassifier { artifact: artifact.into(), slot: OnceLock::new() }
    }

    /// Creates the classifier and tries to load it right away.
    ///
    /// A failed load is logged and leaves the classifier unloaded; the caller
    /// decides whether that is fatal.
    pub fn load_at_startup(artifact: impl Into<PathBuf>) -> Self {
        let classifier = NetworkClassifier::new(artifact);
        if let Err(e) = classifier.load() {
            error!(error = %e, "model load failed; predictions will be refused until restart");
        }
        classifier
    }

    /// Wraps an in-memory network.
    pub fn from_network(network: Network) -> Result<Self, ClassifierError> {
        network.validate().map_err(ClassifierError::Invalid)?;
        let classifier = NetworkClassifier::new(PathBuf::new());
        // fresh slot, cannot already be set
        let _ = classifier.slot.set(network);
        Ok(classifier)
    }

    /// Loads the artifact into the slot. A no-op when already loaded.
    pub fn load(&self) -> Result<(), ClassifierError> {
        if self.slot.get().is_some() {
            return Ok(());
        }
        let network = Network::load_json(&self.artifact).map_err(|source| ClassifierError::Load {
            path: self.artifact.clone(),
            source,
        })?;
        info!(
            path = %self.artifact.display(),
            layers = network.layers.len(),
            inputs = network.input_size(),
            outputs = network.output_size(),
            params = network.param_count(),
            "model loaded"
        );
        // a concurrent loader may have won; either copy is the same artifact
        let _ = self.slot.set(network);
        Ok(())
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn network(&self) -> Option<&Network> {
        self.slot.get()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.network().and_then(|n| n.metadata.as_ref())
    }
}

impl ClassifierPort for NetworkClassifier {
    fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    fn output_width(&self) -> Option<usize> {
        self.network().map(Network::output_size)
    }

    fn input_len(&self) -> Option<usize> {
        self.network().map(Network::input_size)
    }

    fn info(&self) -> Option<ModelInfo> {
        let network = self.network()?;
        let metadata = network.metadata.as_ref();
        let input_shape = match metadata.and_then(|m| m.input_type.as_ref()) {
            Some(InputType::ImageRgb { width, height }) => {
                vec![*height as usize, *width as usize, 3]
            }
            _ => vec![network.input_size()],
        };
        Some(ModelInfo {
            input_shape,
            output_shape: vec![network.output_size()],
            total_params: network.param_count(),
            description: metadata.and_then(|m| m.description.clone()),
            output_labels: metadata.and_then(|m| m.output_labels.clone()),
        })
    }

    fn score(&self, tensor: &PreprocessedTensor) -> Result<Vec<ClassScores>, ClassifierError> {
        let network = self.slot.get().ok_or(ClassifierError::Unavailable)?;

        if tensor.batch_size() == 0 {
            return Err(ClassifierError::Inference("tensor has an empty batch".into()));
        }
        if tensor.sample_len() != network.input_size() {
            return Err(ClassifierError::Inference(format!(
                "input has {} values per sample, model expects {}",
                tensor.sample_len(),
                network.input_size()
            )));
        }

        tensor.samples().enumerate().map(|(row, sample)| {
            let input: Vec<f64> = sample.iter().map(|&v| f64::from(v)).collect();
            let output = network.forward(&input).ok_or_else(|| {
                ClassifierError::Inference(format!("forward pass failed on batch row {}", row))
            })?;
            if output.iter().any(|v| !v.is_finite()) {
                return Err(ClassifierError::Inference(format!(
                    "model produced non-finite scores on batch row {}",
                    row
                )));
            }
            Ok(ClassScores(output))
        }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::error::{ErrorKind, InferenceError};
    use crate::pipeline::preprocessor::stack;

    fn tensor(batch: usize, sample_len: usize, value: f32) -> PreprocessedTensor {
        PreprocessedTensor::new([batch, 1, sample_len / 3, 3], vec![value; batch * sample_len]).unwrap()
    }

    fn network() -> Network {
        Network::new(vec![
            (4, 12, ActivationFunction::ReLU),
            (3, 4, ActivationFunction::Softmax),
        ])
    }

    #[test]
    fn unloaded_classifier_fails_fast() {
        let c = NetworkClassifier::new("does/not/exist.json");
        assert!(!c.is_loaded());
        assert_eq!(c.output_width(), None);
        assert!(matches!(c.score(&tensor(1, 12, 0.5)), Err(ClassifierError::Unavailable)));
    }

    #[test]
    fn missing_artifact_is_a_load_error() {
        let c = NetworkClassifier::load_at_startup("does/not/exist.json");
        assert!(!c.is_loaded());
        assert!(matches!(c.load(), Err(ClassifierError::Load { .. })));
    }

    #[test]
    fn inconsistent_network_is_rejected_as_invalid() {
        let broken = Network::new(vec![
            (4, 12, ActivationFunction::ReLU),
            (3, 5, ActivationFunction::Softmax),
        ]);
        let err = NetworkClassifier::from_network(broken).err().unwrap();
        assert!(matches!(err, ClassifierError::Invalid(ref m) if m.contains("expects 5 inputs")));
        assert_eq!(InferenceError::from(err).kind(), ErrorKind::ModelUnavailableError);
    }

    #[test]
    fn scores_each_batch_row() {
        let c = NetworkClassifier::from_network(network()).unwrap();
        let batch = stack(vec![tensor(1, 12, 0.1), tensor(1, 12, 0.9)]).unwrap();

        let scores = c.score(&batch).unwrap();
        assert_eq!(scores.len(), 2);
        for s in &scores {
            assert_eq!(s.len(), 3);
            assert!((s.0.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let c = NetworkClassifier::from_network(network()).unwrap();
        let t = tensor(1, 12, 0.3);
        assert_eq!(c.score(&t).unwrap(), c.score(&t).unwrap());
    }

    #[test]
    fn wrong_input_length_is_an_inference_error() {
        let c = NetworkClassifier::from_network(network()).unwrap();
        let err = c.score(&tensor(1, 9, 0.5)).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(ref m) if m.contains("expects 12")));
    }

    #[test]
    fn loads_from_artifact_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        network().with_metadata(ModelMetadata {
            description: Some("tiny".into()),
            input_type: Some(InputType::ImageRgb { width: 2, height: 2 }),
            output_labels: None,
        }).save_json(&path).unwrap();

        let c = NetworkClassifier::new(&path);
        c.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        c.load().unwrap();

        assert!(c.is_loaded());
        assert_eq!(c.input_len(), Some(12));
        let info = c.info().unwrap();
        assert_eq!(info.input_shape, vec![2, 2, 3]);
        assert_eq!(info.output_shape, vec![3]);
        assert_eq!(info.description.as_deref(), Some("tiny"));
    }
}
