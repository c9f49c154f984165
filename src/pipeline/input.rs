/// An uploaded image before any validation.
///
/// HTTP multipart parts, raw request bodies and local files are all reduced to
/// this one shape at the boundary; the pipeline never sees anything else.
#[derive(Debug, Clone, Default)]
pub struct RawImageInput {
    pub bytes: Vec<u8>,
    /// Media type claimed by the sender. May be absent or wrong.
    pub declared_media_type: Option<String>,
    /// Original file name, echoed back in batch results.
    pub filename: Option<String>,
}

impl RawImageInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        RawImageInput { bytes, declared_media_type: None, filename: None }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        let trimmed = media_type.trim();
        self.declared_media_type = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Reads a local file, using its name as the filename and guessing the
    /// declared media type from the extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut input = RawImageInput::new(bytes);
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            input = input.with_filename(name);
        }
        let media_type = path.extension()
            .and_then(|s| s.to_str())
            .and_then(|ext| image::ImageFormat::from_extension(ext))
            .map(media_type_for);
        if let Some(media_type) = media_type {
            input = input.with_media_type(media_type);
        }
        Ok(input)
    }

    /// Label used in logs: the filename when known.
    pub fn label(&self) -> &str {
        self.filename.as_deref().unwrap_or("<upload>")
    }
}

/// Canonical media type for the formats this crate decodes.
pub fn media_type_for(format: image::ImageFormat) -> &'static str {
    match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::Bmp => "image/bmp",
        image::ImageFormat::Gif => "image/gif",
        _ => "application/octet-stream",
    }
}
