//! Process command - recognize and extract a single invoice image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use billscan_core::{DocumentProcessor, RecordStore, RuleBasedExtractor, TesseractRecognizer};

use super::output::{format_invoice, print_validation, write_output, OutputFormat};
use super::{file_name, Context};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report fields left empty
    #[arg(long)]
    validate: bool,

    /// Store the result as a processed invoice record
    #[arg(long)]
    save: bool,

    /// Print the recognized text to stderr
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: ProcessArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Running OCR...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let processor = DocumentProcessor::with_extractor(
        TesseractRecognizer::from_config(&config.ocr),
        RuleBasedExtractor::from_config(&config.extraction),
    );
    let input = args.input.clone();
    let result = tokio::task::spawn_blocking(move || processor.process(&input)).await?;

    let result = match result {
        Ok(result) => {
            pb.finish_with_message("Done");
            result
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            anyhow::bail!("Processing failed: {}", e);
        }
    };

    if args.show_text {
        eprintln!("{}", style("Recognized text:").bold());
        eprintln!("{}", result.raw_text);
    }

    if args.validate {
        print_validation(&result.data);
    }

    if args.save {
        let store = ctx.open_store(&config).await?;
        let record = store
            .insert_processed(
                &args.input.display().to_string(),
                &file_name(&args.input),
                &result.raw_text,
                result.data.clone(),
            )
            .await?;
        eprintln!(
            "{} Saved invoice record {}",
            style("✓").green(),
            record.id
        );
    }

    let output = format_invoice(&result.data, args.format, false)?;
    write_output(args.output.as_deref(), &output)?;

    debug!(
        "Total processing time: {:?} (pipeline {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}
