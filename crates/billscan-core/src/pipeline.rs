//! Document processing pipeline: recognize text, then extract fields.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::invoice::{InvoiceExtractor, RuleBasedExtractor};
use crate::models::invoice::InvoiceData;
use crate::ocr::TextRecognizer;

/// Result of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub data: InvoiceData,

    /// Text the data was extracted from.
    pub raw_text: String,

    /// Fields left at their defaults.
    pub warnings: Vec<String>,

    /// Wall-clock time spent, in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs a recognizer and an extractor over documents.
pub struct DocumentProcessor<R, E = RuleBasedExtractor> {
    recognizer: R,
    extractor: E,
}

impl<R: TextRecognizer> DocumentProcessor<R> {
    /// Create a processor with the default rule-based extractor.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            extractor: RuleBasedExtractor::new(),
        }
    }
}

impl<R: TextRecognizer, E: InvoiceExtractor> DocumentProcessor<R, E> {
    pub fn with_extractor(recognizer: R, extractor: E) -> Self {
        Self {
            recognizer,
            extractor,
        }
    }

    /// Recognize a document and extract its invoice fields.
    ///
    /// Recognition errors are returned as-is; extraction does not run.
    pub fn process(&self, path: &Path) -> Result<ExtractionResult> {
        let start = clock();
        info!("Processing {}", path.display());

        let text = self.recognizer.recognize(path)?;
        let mut result = self.process_text(&text);
        result.processing_time_ms = elapsed_ms(start);

        info!(
            "Processed {} in {}ms ({} warnings)",
            path.display(),
            result.processing_time_ms,
            result.warnings.len()
        );

        Ok(result)
    }

    /// Extract invoice fields from already recognized text.
    pub fn process_text(&self, text: &str) -> ExtractionResult {
        let start = clock();
        let data = self.extractor.extract(text);

        let warnings: Vec<String> = data
            .missing_fields()
            .into_iter()
            .map(|field| format!("missing field: {field}"))
            .collect();
        for warning in &warnings {
            warn!("{}", warning);
        }

        ExtractionResult {
            data,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: elapsed_ms(start),
        }
    }
}

// wasm32-unknown-unknown has no monotonic clock; timings read 0 there.
#[cfg(not(target_arch = "wasm32"))]
fn clock() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn clock() -> Option<Instant> {
    None
}

fn elapsed_ms(start: Option<Instant>) -> u64 {
    start.map_or(0, |s| s.elapsed().as_millis() as u64)
}
