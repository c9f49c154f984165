use std::io::Cursor;

use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, warn};

use crate::pipeline::canonical::CanonicalImage;
use crate::pipeline::input::{media_type_for, RawImageInput};

/// Raster formats accepted from uploads.
const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Gif,
];

/// Generic binary type some clients send for every upload.
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image data is empty")]
    Empty,

    #[error("image is {len} bytes (max: {max})")]
    TooLarge { len: usize, max: usize },

    #[error("declared media type {0:?} is not an image")]
    NotAnImage(String),

    #[error("image format not recognized")]
    UnrecognizedFormat,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image is {width}x{height} pixels (max: {max} pixels)")]
    PixelCountTooLarge { width: u32, height: u32, max: u64 },

    #[error("corrupt image data: {0}")]
    Malformed(#[source] image::ImageError),
}

/// Size guards applied before a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_bytes: usize,
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits { max_bytes: 20 * 1024 * 1024, max_pixels: 100_000_000 }
    }
}

/// Turns uploaded bytes into a [`CanonicalImage`].
///
/// The format is sniffed from the bytes. Every color mode is converted to
/// 8-bit RGB; an alpha channel is dropped, not composited onto a background.
#[derive(Debug, Clone, Default)]
pub struct ImageDecoder {
    limits: DecodeLimits,
}

impl ImageDecoder {
    pub fn new(limits: DecodeLimits) -> Self {
        ImageDecoder { limits }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    pub fn decode(&self, input: &RawImageInput) -> Result<CanonicalImage, DecodeError> {
        let bytes = input.bytes.as_slice();
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if bytes.len() > self.limits.max_bytes {
            return Err(DecodeError::TooLarge { len: bytes.len(), max: self.limits.max_bytes });
        }

        let declared = input.declared_media_type.as_deref().map(essence);
        if let Some(declared) = &declared {
            if !declared.starts_with("image/") && declared != OCTET_STREAM {
                return Err(DecodeError::NotAnImage(declared.clone()));
            }
        }

        let format = image::guess_format(bytes).map_err(|_| DecodeError::UnrecognizedFormat)?;
        if !ALLOWED_FORMATS.contains(&format) {
            return Err(DecodeError::UnsupportedFormat(format!("{:?}", format)));
        }

        let sniffed = media_type_for(format);
        if let Some(declared) = declared.filter(|d| d.starts_with("image/")) {
            if !same_media_type(&declared, sniffed) {
                warn!(file = input.label(), declared = %declared, sniffed, "declared media type disagrees with image content");
            }
        }

        let (width, height) = image::io::Reader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(DecodeError::Malformed)?;
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        if u64::from(width) * u64::from(height) > self.limits.max_pixels {
            return Err(DecodeError::PixelCountTooLarge {
                width,
                height,
                max: self.limits.max_pixels,
            });
        }

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(DecodeError::Malformed)?;
        debug!(file = input.label(), ?format, color = ?decoded.color(), width, height, "decoded image");

        Ok(CanonicalImage::from_rgb(decoded.to_rgb8()))
    }
}

/// Lower-cased media type without parameters (`image/PNG; q=1` → `image/png`).
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn same_media_type(declared: &str, sniffed: &str) -> bool {
    declared == sniffed
        || (sniffed == "image/jpeg" && declared == "image/jpg")
        || (sniffed == "image/bmp" && declared == "image/x-ms-bmp")
}
