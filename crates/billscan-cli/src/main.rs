//! CLI application for scanned invoice extraction.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, process, records, suppliers};

/// billscan - Extract structured data from scanned invoices and receipts
#[derive(Parser)]
#[command(name = "billscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the invoice database
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract invoice fields from recognized text
    Extract(extract::ExtractArgs),

    /// Recognize and extract a single invoice image
    Process(process::ProcessArgs),

    /// Process multiple invoice images
    Batch(batch::BatchArgs),

    /// Manage stored invoice records
    Records(records::RecordsArgs),

    /// Manage the supplier directory
    Suppliers(suppliers::SuppliersArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = commands::Context {
        config_path: cli.config,
        store_path: cli.store,
    };

    match cli.command {
        Commands::Extract(args) => extract::run(args, &ctx).await,
        Commands::Process(args) => process::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Records(args) => records::run(args, &ctx).await,
        Commands::Suppliers(args) => suppliers::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
