use serde::{Serialize, Deserialize};
use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// A fully connected layer: `a = activation(x · W + b)`.
///
/// `weights` is laid out as (input_size, size) and `biases` as (1, size).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Creates a randomly initialized layer. ReLU-family layers get He
    /// initialization, everything else Xavier; biases start at zero.
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU
            | ActivationFunction::LeakyReLU { .. }
            | ActivationFunction::Elu { .. } => Matrix::he(input_size, size),
            _ => Matrix::xavier(input_size, size),
        };

        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    /// Number of values this layer expects as input.
    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Forward pass for a single sample. Returns `None` if `input` does not
    /// match the layer's fan-in.
    pub fn feed_from(&self, input: &[f64]) -> Option<Vec<f64>> {
        let mut z = self.weights.left_mul(input)?;
        for (acc, b) in z.iter_mut().zip(self.biases.data.first()?.iter()) {
            *acc += b;
        }
        Some(self.activator.apply(z))
    }

    /// Checks weight/bias shapes against `size` and each other.
    pub fn is_consistent(&self) -> bool {
        self.weights.is_well_formed()
            && self.biases.is_well_formed()
            && self.weights.cols == self.size
            && self.biases.rows == 1
            && self.biases.cols == self.size
    }
}
