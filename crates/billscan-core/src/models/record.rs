//! Stored invoice records with bookkeeping fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invoice::InvoiceData;

/// An invoice as kept by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: Uuid,

    /// Name the uploaded file was stored under (empty for manual records).
    #[serde(default)]
    pub filename: String,

    /// Name of the file as supplied by the user.
    #[serde(default)]
    pub original_filename: String,

    /// Recognized text the data was extracted from.
    #[serde(default)]
    pub extracted_text: String,

    #[serde(default)]
    pub processed_data: Option<InvoiceData>,

    #[serde(default)]
    pub status: RecordStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRecord {
    /// Create a record with a fresh id and timestamps.
    pub fn new(data: Option<InvoiceData>, status: RecordStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: String::new(),
            original_filename: String::new(),
            extracted_text: String::new(),
            processed_data: data,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_source(
        mut self,
        filename: impl Into<String>,
        original_filename: impl Into<String>,
        extracted_text: impl Into<String>,
    ) -> Self {
        self.filename = filename.into();
        self.original_filename = original_filename.into();
        self.extracted_text = extracted_text.into();
        self
    }
}

/// Processing state of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Pending,
    Created,
    Processed,
    Synced,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "pending"),
            RecordStatus::Created => write!(f, "created"),
            RecordStatus::Processed => write!(f, "processed"),
            RecordStatus::Synced => write!(f, "synced"),
        }
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "created" => Ok(RecordStatus::Created),
            "processed" => Ok(RecordStatus::Processed),
            "synced" => Ok(RecordStatus::Synced),
            other => Err(format!("unknown record status: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            RecordStatus::Pending,
            RecordStatus::Created,
            RecordStatus::Processed,
            RecordStatus::Synced,
        ] {
            assert_eq!(RecordStatus::from_str(&status.to_string()), Ok(status));
        }
        assert!(RecordStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_new_record_has_matching_timestamps() {
        let record = InvoiceRecord::new(None, RecordStatus::Created)
            .with_source("1700000000.png", "scan.png", "INVOICE #1");
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.original_filename, "scan.png");
        assert_eq!(record.extracted_text, "INVOICE #1");
    }

    #[test]
    fn test_record_json_uses_snake_case_status() {
        let record = InvoiceRecord::new(Some(InvoiceData::default()), RecordStatus::Processed);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "processed");
        assert_eq!(json["processed_data"]["currency"], "USD");
    }
}
