//! Recognition through an external `tesseract` executable.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info};

use super::{check_format, TextRecognizer};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Runs `<cmd> <image> stdout -l <language>` and returns its output.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
    page_segmentation_mode: Option<u8>,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::from_config(&OcrConfig::default())
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            command: config.tesseract_cmd.clone(),
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn build_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg(path).arg("stdout").arg("-l").arg(&self.language);
        if let Some(psm) = self.page_segmentation_mode {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, path: &Path) -> Result<String, OcrError> {
        check_format(path)?;

        let (width, height) = image::image_dimensions(path)
            .map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)))?;
        info!("Recognizing {} ({}x{})", path.display(), width, height);

        let start = Instant::now();
        let output = self.build_command(path).output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                OcrError::EngineUnavailable(format!("'{}' not found on PATH", self.command))
            }
            _ => OcrError::EngineUnavailable(format!("{}: {}", self.command, e)),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrError::Recognition(stderr));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "Recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer_with(cmd: &str) -> TesseractRecognizer {
        TesseractRecognizer::from_config(&OcrConfig {
            tesseract_cmd: cmd.to_string(),
            ..OcrConfig::default()
        })
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let err = TesseractRecognizer::new().recognize(&path).unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_unreadable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = TesseractRecognizer::new().recognize(&path).unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn test_missing_engine_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let err = recognizer_with("billscan-no-such-tesseract")
            .recognize(&path)
            .unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable(_)));
    }

    #[test]
    fn test_command_arguments() {
        let recognizer = TesseractRecognizer::from_config(&OcrConfig {
            page_segmentation_mode: Some(6),
            ..OcrConfig::default()
        })
        .with_language("deu");

        let cmd = recognizer.build_command(Path::new("scan.png"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "tesseract");
        assert_eq!(args, ["scan.png", "stdout", "-l", "deu", "--psm", "6"]);
    }
}
