//! Record store backed by a SQLite database.
//!
//! Invoice data is kept as a JSON column next to the bookkeeping fields.
//! Timestamps are RFC 3339 text with fixed nanosecond precision, so text
//! order is time order.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use super::{RecordStore, SupplierStore, SyncRecord};
use crate::error::StorageError;
use crate::models::invoice::InvoiceData;
use crate::models::record::{InvoiceRecord, RecordStatus};
use crate::models::supplier::{NewSupplier, Supplier};

pub type DbPool = Pool<Sqlite>;

type InvoiceRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
);

type SupplierRow = (String, String, String, String, String);

const SELECT_INVOICES: &str = "SELECT id, filename, original_filename, extracted_text, \
     processed_data, status, created_at, updated_at FROM invoices";

const INSERT_INVOICE: &str = "INSERT INTO invoices (id, filename, original_filename, \
     extracted_text, processed_data, status, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

// A replaced record keeps its original created_at
const UPSERT_INVOICE: &str = "INSERT INTO invoices (id, filename, original_filename, \
     extracted_text, processed_data, status, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
     ON CONFLICT(id) DO UPDATE SET \
     filename = excluded.filename, \
     original_filename = excluded.original_filename, \
     extracted_text = excluded.extracted_text, \
     processed_data = excluded.processed_data, \
     status = excluded.status, \
     updated_at = excluded.updated_at";

/// Invoice and supplier tables in one SQLite file.
///
/// Writers from separate processes are serialized by SQLite; a busy
/// database is retried for up to five seconds.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open the database at `path`, creating it and its tables if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;
        debug!("Opened record store {}", path.display());

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, StorageError> {
        write_record(&self.pool, INSERT_INVOICE, &record).await?;
        info!("Stored invoice record {} ({})", record.id, record.status);
        Ok(record)
    }
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL DEFAULT '',
            original_filename TEXT NOT NULL DEFAULT '',
            extracted_text TEXT NOT NULL DEFAULT '',
            processed_data TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tax_id TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn write_record<'c, E>(
    executor: E,
    sql: &'static str,
    record: &InvoiceRecord,
) -> Result<(), StorageError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let processed_data = record
        .processed_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StorageError::Serialize(e.to_string()))?;

    sqlx::query(sql)
        .bind(record.id.to_string())
        .bind(record.filename.clone())
        .bind(record.original_filename.clone())
        .bind(record.extracted_text.clone())
        .bind(processed_data)
        .bind(record.status.to_string())
        .bind(timestamp(&record.created_at))
        .bind(timestamp(&record.updated_at))
        .execute(executor)
        .await?;

    Ok(())
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn corrupt(id: &str, reason: impl ToString) -> StorageError {
    StorageError::Corrupt {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_timestamp(id: &str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| corrupt(id, format!("bad timestamp '{value}': {e}")))
}

fn record_from_row(row: InvoiceRow) -> Result<InvoiceRecord, StorageError> {
    let (id, filename, original_filename, extracted_text, data, status, created_at, updated_at) =
        row;

    let processed_data = data
        .map(|json| serde_json::from_str::<InvoiceData>(&json))
        .transpose()
        .map_err(|e| corrupt(&id, e))?;

    Ok(InvoiceRecord {
        id: Uuid::parse_str(&id).map_err(|e| corrupt(&id, e))?,
        filename,
        original_filename,
        extracted_text,
        processed_data,
        status: RecordStatus::from_str(&status).map_err(|e| corrupt(&id, e))?,
        created_at: parse_timestamp(&id, &created_at)?,
        updated_at: parse_timestamp(&id, &updated_at)?,
    })
}

fn supplier_from_row(row: SupplierRow) -> Result<Supplier, StorageError> {
    let (id, name, tax_id, address, created_at) = row;

    Ok(Supplier {
        id: Uuid::parse_str(&id).map_err(|e| corrupt(&id, e))?,
        name,
        tax_id,
        address,
        created_at: parse_timestamp(&id, &created_at)?,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create(
        &self,
        data: InvoiceData,
        status: RecordStatus,
    ) -> Result<InvoiceRecord, StorageError> {
        self.insert(InvoiceRecord::new(Some(data), status)).await
    }

    async fn insert_processed(
        &self,
        filename: &str,
        original_filename: &str,
        extracted_text: &str,
        data: InvoiceData,
    ) -> Result<InvoiceRecord, StorageError> {
        let record = InvoiceRecord::new(Some(data), RecordStatus::Processed).with_source(
            filename,
            original_filename,
            extracted_text,
        );
        self.insert(record).await
    }

    async fn list(&self) -> Result<Vec<InvoiceRecord>, StorageError> {
        let sql = format!("{SELECT_INVOICES} ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<InvoiceRecord, StorageError> {
        let sql = format!("{SELECT_INVOICES} WHERE id = ?");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound(id))?;

        record_from_row(row)
    }

    async fn update(&self, id: Uuid, data: InvoiceData) -> Result<InvoiceRecord, StorageError> {
        let json =
            serde_json::to_string(&data).map_err(|e| StorageError::Serialize(e.to_string()))?;

        let result =
            sqlx::query("UPDATE invoices SET processed_data = ?, updated_at = ? WHERE id = ?")
                .bind(json)
                .bind(timestamp(&Utc::now()))
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        info!("Updated invoice record {}", id);
        self.get(id).await
    }

    async fn sync(&self, incoming: Vec<SyncRecord>) -> Result<usize, StorageError> {
        let now = Utc::now();
        let count = incoming.len();

        let mut tx = self.pool.begin().await?;
        for sync_record in incoming {
            let record = sync_record.into_record(now, now);
            write_record(&mut *tx, UPSERT_INVOICE, &record).await?;
        }
        tx.commit().await?;

        info!("Synced {} invoice records", count);
        Ok(count)
    }
}

#[async_trait]
impl SupplierStore for SqliteStore {
    async fn add_supplier(&self, supplier: NewSupplier) -> Result<Supplier, StorageError> {
        let supplier = supplier.into_supplier()?;

        sqlx::query(
            "INSERT INTO suppliers (id, name, tax_id, address, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(supplier.id.to_string())
        .bind(supplier.name.clone())
        .bind(supplier.tax_id.clone())
        .bind(supplier.address.clone())
        .bind(timestamp(&supplier.created_at))
        .execute(&self.pool)
        .await?;

        info!("Added supplier {} ({})", supplier.name, supplier.id);
        Ok(supplier)
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StorageError> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, tax_id, address, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(supplier_from_row).collect()
    }
}
