//! Records command - manage stored invoice records.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde::Deserialize;
use uuid::Uuid;

use billscan_core::{InvoiceData, RecordStatus, RecordStore, SyncRecord};

use super::Context;

/// Arguments for the records command.
#[derive(Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    command: RecordsCommand,
}

#[derive(Subcommand)]
enum RecordsCommand {
    /// List records, newest first
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record as JSON
    Show {
        /// Record id
        id: Uuid,
    },

    /// Create a record from invoice JSON
    Create {
        /// Invoice JSON file (`-` for stdin)
        file: PathBuf,
    },

    /// Replace the invoice data of a record
    Update {
        /// Record id
        id: Uuid,
        /// Invoice JSON file (`-` for stdin)
        file: PathBuf,
    },

    /// Insert or replace records created offline
    Sync {
        /// JSON file with an `invoices` array or a bare array (`-` for stdin)
        file: PathBuf,
    },

    /// Show totals across all records
    Stats,
}

/// Accepted sync payload shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum SyncPayload {
    Wrapped { invoices: Vec<SyncRecord> },
    Bare(Vec<SyncRecord>),
}

pub async fn run(args: RecordsArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config).await?;

    match args.command {
        RecordsCommand::List { json } => list_records(&store, json).await,
        RecordsCommand::Show { id } => {
            let record = store.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        RecordsCommand::Create { file } => {
            let data: InvoiceData = serde_json::from_str(&read_input(&file)?)?;
            let record = store.create(data, RecordStatus::Created).await?;
            eprintln!("{} Created invoice record", style("✓").green());
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        RecordsCommand::Update { id, file } => {
            let data: InvoiceData = serde_json::from_str(&read_input(&file)?)?;
            store.update(id, data).await?;
            println!("{} Invoice {} updated", style("✓").green(), id);
            Ok(())
        }
        RecordsCommand::Sync { file } => {
            let records = match serde_json::from_str(&read_input(&file)?) {
                Ok(SyncPayload::Wrapped { invoices }) => invoices,
                Ok(SyncPayload::Bare(records)) => records,
                Err(e) => anyhow::bail!("Invalid sync data: {}", e),
            };
            let count = store.sync(records).await?;
            println!("{} Synced {} records", style("✓").green(), count);
            Ok(())
        }
        RecordsCommand::Stats => {
            let summary = store.summary().await?;
            println!("Records:   {}", summary.count);
            println!("Processed: {}", summary.processed);
            println!("Synced:    {}", summary.synced);
            println!("Total:     {}", summary.total_amount);
            Ok(())
        }
    }
}

async fn list_records(store: &impl RecordStore, json: bool) -> anyhow::Result<()> {
    let records = store.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No invoice records", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{:<36}  {:<9}  {:<16}  {:>12}  {}",
        "ID", "STATUS", "INVOICE", "TOTAL", "CREATED"
    );
    for record in &records {
        let (number, total) = record
            .processed_data
            .as_ref()
            .map(|d| {
                (
                    d.invoice_number.as_str(),
                    format!("{} {}", d.total_amount, d.currency),
                )
            })
            .unwrap_or(("", String::new()));

        println!(
            "{:<36}  {:<9}  {:<16}  {:>12}  {}",
            record.id,
            record.status.to_string(),
            number,
            total,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}
