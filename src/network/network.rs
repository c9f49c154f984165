use std::io::{Error, ErrorKind};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::{activation::activation::ActivationFunction, layers::dense::Layer};
use crate::network::metadata::ModelMetadata;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation))
            .collect();
        Network { layers, metadata: None }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Network {
        self.metadata = Some(metadata);
        self
    }

    /// Forward pass for one sample.
    ///
    /// Takes `&self`: no activations are cached, so a loaded network can be
    /// shared across threads and evaluated concurrently.
    pub fn forward(&self, input: &[f64]) -> Option<Vec<f64>> {
        let mut layers = self.layers.iter();
        let mut current = layers.next()?.feed_from(input)?;
        for layer in layers {
            current = layer.feed_from(&current)?;
        }
        Some(current)
    }

    /// Length of the input vector the first layer expects.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    /// Width of the output layer.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    /// Total number of weights and biases.
    pub fn param_count(&self) -> usize {
        self.layers.iter()
            .map(|l| l.weights.rows * l.weights.cols + l.biases.cols)
            .sum()
    }

    /// Checks that the network is non-empty, every layer is internally
    /// consistent and adjacent layers agree on their widths.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network has no layers".into());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if !layer.is_consistent() {
                return Err(format!("layer {} has inconsistent weight/bias shapes", i));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size() != pair[0].size {
                return Err(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i + 1, pair[1].input_size(), i, pair[0].size
                ));
            }
        }
        Ok(())
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::new(ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by
    /// `save_json`, rejecting structurally invalid networks.
    pub fn load_json(path: impl AsRef<Path>) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        network.validate()
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
        Ok(network)
    }
}
