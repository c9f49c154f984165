/// A dense `[N, H, W, 3]` f32 tensor in row-major (NHWC) order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl PreprocessedTensor {
    /// Wraps `data` if its length matches `shape`.
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Option<Self> {
        (shape.iter().product::<usize>() == data.len()).then_some(PreprocessedTensor { shape, data })
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    /// Number of values in one batch row (`H * W * 3`).
    pub fn sample_len(&self) -> usize {
        self.shape[1] * self.shape[2] * self.shape[3]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Iterates over the flattened batch rows.
    pub fn samples(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on 0
        let len = self.sample_len().max(1);
        self.data.chunks_exact(len)
    }
}
