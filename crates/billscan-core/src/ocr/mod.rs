//! Text recognition collaborators.
//!
//! The extraction engine only ever sees text; recognizers turn a document
//! on disk into that text.

#[cfg(feature = "native")]
mod tesseract;

#[cfg(feature = "native")]
pub use tesseract::TesseractRecognizer;

use std::path::Path;

use crate::error::OcrError;

/// Raster image extensions accepted for recognition.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp"];

/// Turns a document file into recognized text.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<String, OcrError>;
}

/// Recognizer that returns preset text regardless of the input file.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    text: String,
}

impl StaticRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextRecognizer for StaticRecognizer {
    fn recognize(&self, _path: &Path) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Check that a path has a supported raster image extension.
pub fn check_format(path: &Path) -> Result<(), OcrError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(OcrError::UnsupportedFormat(path.display().to_string()))
    }
}
