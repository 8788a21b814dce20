//! Configuration structures for the billscan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for billscan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// Text recognition configuration.
    pub ocr: OcrConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Record store configuration.
    pub storage: StorageConfig,
}

/// Text recognition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable name or path.
    pub tesseract_cmd: String,

    /// Recognition language passed to tesseract.
    pub language: String,

    /// Page segmentation mode (`--psm`), if set.
    pub page_segmentation_mode: Option<u8>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            page_segmentation_mode: None,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of item lines kept per invoice.
    pub max_items: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { max_items: 5 }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the SQLite record database. Falls back to the user data directory.
    pub path: Option<PathBuf>,
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BillscanConfig::default();
        assert_eq!(config.ocr.tesseract_cmd, "tesseract");
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.extraction.max_items, 5);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: BillscanConfig =
            serde_json::from_str(r#"{"ocr": {"language": "eng", "page_segmentation_mode": 6}}"#)
                .unwrap();
        assert_eq!(config.ocr.page_segmentation_mode, Some(6));
        assert_eq!(config.ocr.tesseract_cmd, "tesseract");
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillscanConfig::default();
        config.extraction.max_items = 3;
        config.storage.path = Some(PathBuf::from("/tmp/invoices.db"));
        config.save(&path).unwrap();

        assert_eq!(BillscanConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = BillscanConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
