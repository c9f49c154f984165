use image::RgbImage;

/// A decoded image in the one color layout the pipeline works with:
/// 8-bit RGB, row-major, no alpha.
///
/// Produced once per request by the decoder and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalImage {
    pixels: RgbImage,
}

impl CanonicalImage {
    /// Wraps an already-decoded RGB buffer.
    pub fn from_rgb(pixels: RgbImage) -> Self {
        CanonicalImage { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`
    pub fn dims(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn channels(&self) -> usize {
        3
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}
