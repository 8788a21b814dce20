//! Extract command - invoice fields from already recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use billscan_core::{InvoiceExtractor, RuleBasedExtractor};

use super::output::{format_invoice, print_validation, write_output, OutputFormat};
use super::Context;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file to read (stdin when omitted or `-`)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report fields left empty
    #[arg(long)]
    validate: bool,

    /// Include subtotal, tax, discount and grand total
    #[arg(long)]
    totals: bool,

    /// Show which pattern resolved each field
    #[arg(long)]
    explain: bool,
}

pub async fn run(args: ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;

    let text = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            info!("Reading text from {}", path.display());
            fs::read_to_string(path)?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let extractor = RuleBasedExtractor::from_config(&config.extraction);
    let data = extractor.extract(&text);

    if args.explain {
        eprintln!("{}", style("Field resolution:").bold());
        for resolution in extractor.explain(&text) {
            match resolution.resolved {
                Some(m) => eprintln!(
                    "  {:<16} pattern #{} -> {:?}",
                    resolution.field.name(),
                    m.priority + 1,
                    m.value
                ),
                None => eprintln!("  {:<16} {}", resolution.field.name(), style("default").dim()),
            }
        }
    }

    if args.validate {
        print_validation(&data);
    }

    let output = format_invoice(&data, args.format, args.totals)?;
    write_output(args.output.as_deref(), &output)
}
