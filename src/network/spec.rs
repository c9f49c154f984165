use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::network::metadata::{InputType, ModelMetadata};
use crate::network::network::Network;

/// One dense layer of an architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// Weight-free description of a network: layer shapes plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// RGB image classifier: `width*height*3` inputs, ReLU hidden layers,
    /// and a Softmax output with one unit per label.
    pub fn image_classifier(width: u32, height: u32, hidden: &[usize], labels: Vec<String>) -> NetworkSpec {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut input_size = width as usize * height as usize * 3;
        for &size in hidden {
            layers.push(LayerSpec { size, input_size, activation: ActivationFunction::ReLU });
            input_size = size;
        }
        layers.push(LayerSpec {
            size: labels.len(),
            input_size,
            activation: ActivationFunction::Softmax,
        });

        NetworkSpec {
            layers,
            metadata: Some(ModelMetadata {
                description: Some(format!("{}-class leaf classifier", labels.len())),
                input_type: Some(InputType::ImageRgb { width, height }),
                output_labels: Some(labels),
            }),
        }
    }

    /// Randomly initialized network with this architecture.
    pub fn build(&self) -> Network {
        let network = Network::new(
            self.layers.iter().map(|l| (l.size, l.input_size, l.activation.clone())).collect(),
        );
        match &self.metadata {
            Some(metadata) => network.with_metadata(metadata.clone()),
            None => network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_classifier_chains_layer_widths() {
        let spec = NetworkSpec::image_classifier(4, 2, &[8, 5], vec!["a".into(), "b".into(), "c".into()]);
        let shapes: Vec<(usize, usize)> = spec.layers.iter().map(|l| (l.input_size, l.size)).collect();
        assert_eq!(shapes, vec![(24, 8), (8, 5), (5, 3)]);

        let net = spec.build();
        net.validate().unwrap();
        assert_eq!(net.input_size(), 24);
        assert_eq!(net.output_size(), 3);
        assert!(matches!(
            net.metadata.as_ref().and_then(|m| m.input_type.as_ref()),
            Some(InputType::ImageRgb { width: 4, height: 2 })
        ));
    }

    #[test]
    fn no_hidden_layers_is_a_single_softmax() {
        let spec = NetworkSpec::image_classifier(1, 1, &[], vec!["x".into(), "y".into()]);
        assert_eq!(spec.layers.len(), 1);
        assert_eq!(spec.layers[0].activation, ActivationFunction::Softmax);
    }
}
