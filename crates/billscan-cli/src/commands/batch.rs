//! Batch processing command for multiple invoice images.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use billscan_core::{
    DocumentProcessor, ExtractionResult, RecordStore, RuleBasedExtractor, TesseractRecognizer,
    SUPPORTED_EXTENSIONS,
};

use super::output::{format_invoice, OutputFormat};
use super::{file_name, Context};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input images
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Store every successful result as a processed invoice record
    #[arg(long)]
    save: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<ExtractionResult, String>,
}

type Processor = DocumentProcessor<TesseractRecognizer, RuleBasedExtractor>;

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;

    let files = expand_pattern(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let processor: Arc<Processor> = Arc::new(DocumentProcessor::with_extractor(
        TesseractRecognizer::from_config(&config.ocr),
        RuleBasedExtractor::from_config(&config.extraction),
    ));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let task_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || processor.process(&task_path))
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r.map_err(|e| e.to_string()));
            (index, FileResult { path, outcome })
        });
    }

    let mut slots: Vec<Option<FileResult>> = files.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        pb.inc(1);

        if let Err(e) = &result.outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), e);
            } else {
                error!("Failed to process {}: {}", result.path.display(), e);
                tasks.abort_all();
                pb.abandon_with_message("Aborted");
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), e);
            }
        }

        slots[index] = Some(result);
    }

    pb.finish_with_message("Complete");

    // Keep input order regardless of completion order
    let results: Vec<FileResult> = slots.into_iter().flatten().collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(extraction) = &result.outcome {
                write_file_output(output_dir, &result.path, extraction, args.format)?;
            }
        }
    }

    if args.save {
        let store = ctx.open_store(&config).await?;
        for result in &results {
            if let Ok(extraction) = &result.outcome {
                store
                    .insert_processed(
                        &result.path.display().to_string(),
                        &file_name(&result.path),
                        &extraction.raw_text,
                        extraction.data.clone(),
                    )
                    .await?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.outcome.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(e) = &result.outcome {
                println!("  - {}: {}", result.path.display(), e);
            }
        }
    }

    Ok(())
}

/// Expand a glob pattern to the supported image files it matches.
fn expand_pattern(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .collect();
    Ok(files)
}

fn write_file_output(
    output_dir: &Path,
    input: &Path,
    extraction: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    let content = format_invoice(&extraction.data, format, false)?;
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "supplier_name",
        "total_amount",
        "currency",
        "items",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = file_name(&result.path);

        match &result.outcome {
            Ok(extraction) => {
                let data = &extraction.data;
                wtr.write_record([
                    filename.as_str(),
                    "success",
                    &data.invoice_number,
                    &data.date,
                    &data.supplier_name,
                    &data.total_amount,
                    data.currency.code(),
                    &data.items.len().to_string(),
                    &extraction.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            Err(e) => {
                wtr.write_record([
                    filename.as_str(),
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    e.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
