//! Persistent invoice and supplier store.

mod sqlite;

pub use sqlite::{DbPool, SqliteStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::invoice::InvoiceData;
use crate::models::record::{InvoiceRecord, RecordStatus};
use crate::models::supplier::{NewSupplier, Supplier};

/// A record pushed from an offline client.
///
/// Every field except the id is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: Uuid,
    pub filename: Option<String>,
    pub original_filename: Option<String>,
    pub extracted_text: Option<String>,
    pub processed_data: Option<InvoiceData>,
    pub status: Option<RecordStatus>,
}

impl SyncRecord {
    /// Build the stored record, keeping `created_at` from a replaced one.
    pub fn into_record(self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> InvoiceRecord {
        InvoiceRecord {
            id: self.id,
            filename: self.filename.unwrap_or_default(),
            original_filename: self.original_filename.unwrap_or_default(),
            extracted_text: self.extracted_text.unwrap_or_default(),
            processed_data: Some(self.processed_data.unwrap_or_default()),
            status: self.status.unwrap_or(RecordStatus::Synced),
            created_at,
            updated_at: now,
        }
    }
}

/// Aggregate figures over all stored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub count: usize,
    pub processed: usize,
    pub synced: usize,
    /// Sum of every parseable `total_amount`.
    pub total_amount: Decimal,
}

impl StoreSummary {
    pub fn from_records(records: &[InvoiceRecord]) -> Self {
        let mut summary = Self {
            count: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.status {
                RecordStatus::Processed => summary.processed += 1,
                RecordStatus::Synced => summary.synced += 1,
                _ => {}
            }
            if let Some(total) = record
                .processed_data
                .as_ref()
                .and_then(InvoiceData::total_amount_decimal)
            {
                summary.total_amount = summary.total_amount.saturating_add(total);
            }
        }

        summary
    }
}

/// Storage operations for invoice records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a manually entered invoice under a new id.
    async fn create(
        &self,
        data: InvoiceData,
        status: RecordStatus,
    ) -> Result<InvoiceRecord, StorageError>;

    /// Store the result of processing an uploaded file.
    async fn insert_processed(
        &self,
        filename: &str,
        original_filename: &str,
        extracted_text: &str,
        data: InvoiceData,
    ) -> Result<InvoiceRecord, StorageError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<InvoiceRecord>, StorageError>;

    async fn get(&self, id: Uuid) -> Result<InvoiceRecord, StorageError>;

    /// Replace the invoice data of a record.
    async fn update(&self, id: Uuid, data: InvoiceData) -> Result<InvoiceRecord, StorageError>;

    /// Insert or replace records by id. Returns the number written.
    async fn sync(&self, records: Vec<SyncRecord>) -> Result<usize, StorageError>;

    async fn summary(&self) -> Result<StoreSummary, StorageError> {
        Ok(StoreSummary::from_records(&self.list().await?))
    }
}

/// Storage operations for the supplier directory.
#[async_trait]
pub trait SupplierStore: Send + Sync {
    /// Validate and store a supplier under a new id.
    async fn add_supplier(&self, supplier: NewSupplier) -> Result<Supplier, StorageError>;

    /// All suppliers ordered by name.
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sync_record_defaults() {
        let now = Utc::now();
        let record: SyncRecord =
            serde_json::from_str(r#"{"id": "6f1c2a64-3f51-4a3c-9a39-1f7ad1b0c0de"}"#).unwrap();
        let stored = record.into_record(now, now);

        assert_eq!(stored.status, RecordStatus::Synced);
        assert_eq!(stored.filename, "");
        assert_eq!(stored.processed_data, Some(InvoiceData::default()));
    }

    #[test]
    fn test_sync_record_requires_id() {
        assert!(serde_json::from_str::<SyncRecord>(r#"{"status": "synced"}"#).is_err());
    }

    #[test]
    fn test_summary_sums_parseable_totals() {
        let mut a = InvoiceData::default();
        a.total_amount = "10.50".to_string();
        let mut b = InvoiceData::default();
        b.total_amount = "n/a".to_string();

        let records = vec![
            InvoiceRecord::new(Some(a), RecordStatus::Processed),
            InvoiceRecord::new(Some(b), RecordStatus::Synced),
            InvoiceRecord::new(None, RecordStatus::Created),
        ];
        let summary = StoreSummary::from_records(&records);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.total_amount, Decimal::from_str("10.50").unwrap());
    }
}
