//! Core library for scanned invoice processing.
//!
//! This crate provides:
//! - Rule-based invoice field extraction from recognized text
//! - Invoice data models with totals calculation
//! - A text-recognition collaborator backed by the `tesseract` executable
//! - A SQLite store for processed invoices and suppliers

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;
#[cfg(feature = "native")]
pub mod store;

pub use error::{BillscanError, Result};
pub use invoice::{extract, FieldResolution, InvoiceExtractor, RuleBasedExtractor};
pub use models::invoice::{Currency, InvoiceData, InvoiceTotals, Item};
pub use ocr::{StaticRecognizer, TextRecognizer, SUPPORTED_EXTENSIONS};
#[cfg(feature = "native")]
pub use ocr::TesseractRecognizer;
pub use pipeline::{DocumentProcessor, ExtractionResult};
#[cfg(feature = "native")]
pub use models::record::{InvoiceRecord, RecordStatus};
#[cfg(feature = "native")]
pub use models::supplier::{NewSupplier, Supplier};
#[cfg(feature = "native")]
pub use store::{RecordStore, SqliteStore, StoreSummary, SupplierStore, SyncRecord};
