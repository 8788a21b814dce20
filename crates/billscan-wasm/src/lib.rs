//! WASM bindings for invoice field extraction.
//!
//! Text recognition happens in the browser; these bindings take the
//! recognized text and return structured invoice data.

use wasm_bindgen::prelude::*;

use billscan_core::invoice::rules::detect_currency as detect_currency_code;
use billscan_core::{
    DocumentProcessor, InvoiceData, InvoiceExtractor as _, RuleBasedExtractor, StaticRecognizer,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract invoice data from recognized text.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&billscan_core::extract(text))
}

/// Detect the currency code (`USD`, `BDT`, `EUR` or `GBP`) used in text.
#[wasm_bindgen]
pub fn detect_currency(text: &str) -> String {
    detect_currency_code(text).code().to_string()
}

/// Compute subtotal, tax, discount and total for an invoice object.
///
/// Amounts are returned as decimal strings.
#[wasm_bindgen]
pub fn compute_totals(invoice: JsValue) -> Result<JsValue, JsValue> {
    let data: InvoiceData = serde_wasm_bindgen::from_value(invoice)
        .map_err(|e| JsValue::from_str(&format!("Invalid invoice: {}", e)))?;
    to_js(&data.totals())
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    extractor: RuleBasedExtractor,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: RuleBasedExtractor::new(),
        }
    }

    /// Limit the number of extracted line items.
    #[wasm_bindgen]
    pub fn set_max_items(&mut self, max_items: usize) {
        self.extractor = RuleBasedExtractor::new().with_max_items(max_items);
    }

    /// Extract invoice from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text))
    }

    /// Get extraction result with missing-field warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let processor =
            DocumentProcessor::with_extractor(StaticRecognizer::default(), self.extractor.clone());
        to_js(&processor.process_text(text))
    }

    /// Explain which pattern resolved each field.
    #[wasm_bindgen]
    pub fn explain(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.explain(text))
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_detect_currency() {
        assert_eq!(detect_currency("Total: €12"), "EUR");
        assert_eq!(detect_currency("Total: 12"), "USD");
    }

    #[wasm_bindgen_test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_extract_returns_object() {
        let value = extract_invoice_from_text("Invoice # W-1\nTotal: $5.00").unwrap();
        assert!(value.is_object());
    }

    #[wasm_bindgen_test]
    fn test_compute_totals_rejects_non_object() {
        assert!(compute_totals(JsValue::from_str("nope")).is_err());
    }
}
