use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb, Rgba};
use leafscan::{
    ClassScores, ClassifierError, ClassifierPort, InferenceService, PreprocessedTensor,
    ServiceConfig, TargetSize,
};

/// Small target so tests stay fast.
pub const TEST_TARGET: TargetSize = TargetSize { width: 8, height: 8 };

/// Classifier that returns the same scores for every image and counts calls.
pub struct StubClassifier {
    scores: Vec<f64>,
    reports_shape: bool,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(scores: Vec<f64>) -> Self {
        StubClassifier { scores, reports_shape: true, calls: AtomicUsize::new(0) }
    }

    /// Hides output width and input length, skipping the startup checks.
    pub fn hiding_shape(mut self) -> Self {
        self.reports_shape = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClassifierPort for StubClassifier {
    fn is_loaded(&self) -> bool {
        true
    }

    fn output_width(&self) -> Option<usize> {
        self.reports_shape.then_some(self.scores.len())
    }

    fn input_len(&self) -> Option<usize> {
        self.reports_shape.then_some(TEST_TARGET.input_len())
    }

    fn score(&self, tensor: &PreprocessedTensor) -> Result<Vec<ClassScores>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ClassScores(self.scores.clone()); tensor.batch_size()])
    }
}

/// Classifier whose model never loaded.
#[derive(Default)]
pub struct UnloadedClassifier {
    calls: AtomicUsize,
}

impl UnloadedClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClassifierPort for UnloadedClassifier {
    fn is_loaded(&self) -> bool {
        false
    }

    fn output_width(&self) -> Option<usize> {
        None
    }

    fn score(&self, _tensor: &PreprocessedTensor) -> Result<Vec<ClassScores>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClassifierError::Unavailable)
    }
}

/// Config with the given classes and the small test target.
pub fn test_config(classes: &[&str]) -> ServiceConfig {
    ServiceConfig {
        target_size: TEST_TARGET,
        class_catalog: classes.iter().map(|c| c.to_string()).collect(),
        batch_workers: 2,
        ..ServiceConfig::default()
    }
}

/// Service over `classifier` with a `["healthy", "blight"]` catalog.
pub fn two_class_service<C: ClassifierPort + 'static>(classifier: Arc<C>) -> InferenceService {
    InferenceService::new(classifier, &test_config(&["healthy", "blight"]))
        .expect("Failed to build test service")
}

/// A `width`x`height` leaf-green gradient.
pub fn leaf_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, 160, (y * 5 % 256) as u8])
    }))
}

fn encode(img: &DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&leaf_image(width, height), ImageOutputFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&leaf_image(width, height), ImageOutputFormat::Jpeg(90))
}

/// Semi-transparent RGBA PNG.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |_, _| Rgba([30, 200, 60, 128])));
    encode(&img, ImageOutputFormat::Png)
}
