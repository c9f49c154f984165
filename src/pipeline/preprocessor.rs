use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::canonical::CanonicalImage;
use crate::pipeline::tensor::PreprocessedTensor;

/// Resampling filter used for every resize. Changing it changes the numeric
/// input to the classifier and therefore the scores.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("image has zero area: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("target size has zero area: {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },

    #[error("expected {expected} channel values, found {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("cannot stack tensors of shapes {first:?} and {other:?}")]
    ShapeMismatch { first: [usize; 4], other: [usize; 4] },

    #[error("cannot stack an empty batch")]
    EmptyBatch,
}

/// Fixed `(width, height)` the classifier expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        TargetSize { width, height }
    }

    /// Values per sample: `height * width * 3`.
    pub fn input_len(&self) -> usize {
        self.height as usize * self.width as usize * 3
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        TargetSize { width: 256, height: 256 }
    }
}

/// Resizes a canonical image to the target size and scales it into
/// `[1, H, W, 3]` f32 values in `[0, 1]`.
///
/// Pure: the same image and target always give bit-identical tensors.
pub fn prepare(image: &CanonicalImage, target: TargetSize) -> Result<PreprocessedTensor, PreprocessError> {
    let (width, height) = image.dims();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }
    if target.width == 0 || target.height == 0 {
        return Err(PreprocessError::EmptyTarget { width: target.width, height: target.height });
    }
    let expected = width as usize * height as usize * image.channels();
    let found = image.as_rgb().as_raw().len();
    if found != expected {
        return Err(PreprocessError::ChannelMismatch { expected, found });
    }

    let resized = if (width, height) == (target.width, target.height) {
        image.as_rgb().clone()
    } else {
        imageops::resize(image.as_rgb(), target.width, target.height, RESAMPLE_FILTER)
    };

    let data: Vec<f32> = resized.into_raw().into_iter().map(|c| c as f32 / 255.0).collect();
    let shape = [1, target.height as usize, target.width as usize, 3];
    PreprocessedTensor::new(shape, data)
        .ok_or(PreprocessError::ChannelMismatch { expected: target.input_len(), found: 0 })
}

/// Concatenates single-image tensors of identical shape into `[N, H, W, 3]`.
pub fn stack(tensors: Vec<PreprocessedTensor>) -> Result<PreprocessedTensor, PreprocessError> {
    let first = tensors.first().ok_or(PreprocessError::EmptyBatch)?.shape();
    let mut batch = 0;
    let mut data = Vec::with_capacity(tensors.iter().map(|t| t.as_slice().len()).sum());
    for tensor in &tensors {
        let shape = tensor.shape();
        if shape[1..] != first[1..] {
            return Err(PreprocessError::ShapeMismatch { first, other: shape });
        }
        batch += shape[0];
        data.extend_from_slice(tensor.as_slice());
    }
    let shape = [batch, first[1], first[2], first[3]];
    let found = data.len();
    PreprocessedTensor::new(shape, data).ok_or(PreprocessError::ChannelMismatch {
        expected: shape.iter().product(),
        found,
    })
}
