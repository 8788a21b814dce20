//! Error types for the billscan-core library.
//!
//! Field extraction itself never fails; these cover the collaborators
//! around it.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// Text recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Record store error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The file is not a raster image format the recognizer accepts.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image could not be read or decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The recognition engine could not be started.
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors related to the invoice record store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record exists with the requested id.
    #[cfg(feature = "native")]
    #[error("invoice not found: {0}")]
    NotFound(uuid::Uuid),

    /// A stored row could not be decoded.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// A supplier failed validation and was not stored.
    #[error("invalid supplier: {0}")]
    InvalidSupplier(String),

    /// The database rejected a query or could not be opened.
    #[cfg(feature = "native")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Preparing the database location failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invoice data could not be serialized.
    #[error("failed to serialize invoice data: {0}")]
    Serialize(String),
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;
