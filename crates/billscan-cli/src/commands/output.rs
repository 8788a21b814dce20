//! Rendering of extracted invoices as JSON, CSV or text.

use std::fs;
use std::path::Path;

use console::style;
use serde::Serialize;

use billscan_core::{InvoiceData, InvoiceTotals};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct InvoiceOutput<'a> {
    #[serde(flatten)]
    data: &'a InvoiceData,
    #[serde(skip_serializing_if = "Option::is_none")]
    totals: Option<InvoiceTotals>,
}

/// Render an invoice, optionally with derived totals.
pub fn format_invoice(
    data: &InvoiceData,
    format: OutputFormat,
    with_totals: bool,
) -> anyhow::Result<String> {
    let totals = with_totals.then(|| data.totals());

    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&InvoiceOutput { data, totals })?),
        OutputFormat::Csv => format_csv(data, totals.as_ref()),
        OutputFormat::Text => Ok(format_text(data, totals.as_ref())),
    }
}

fn format_csv(data: &InvoiceData, totals: Option<&InvoiceTotals>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "invoice_number",
        "date",
        "due_date",
        "supplier_name",
        "supplier_address",
        "customer_name",
        "customer_address",
        "total_amount",
        "currency",
        "tax_rate",
        "discount_rate",
        "items",
    ];
    if totals.is_some() {
        header.extend(["subtotal", "tax_amount", "discount_amount", "total"]);
    }
    wtr.write_record(&header)?;

    let mut row = vec![
        data.invoice_number.clone(),
        data.date.clone(),
        data.due_date.clone(),
        data.supplier_name.clone(),
        data.supplier_address.clone(),
        data.customer_name.clone(),
        data.customer_address.clone(),
        data.total_amount.clone(),
        data.currency.to_string(),
        data.tax_rate.to_string(),
        data.discount_rate.to_string(),
        data.items.len().to_string(),
    ];
    if let Some(t) = totals {
        row.extend([
            t.subtotal.to_string(),
            t.tax_amount.to_string(),
            t.discount_amount.to_string(),
            t.total.to_string(),
        ]);
    }
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(data: &InvoiceData, totals: Option<&InvoiceTotals>) -> String {
    let mut output = String::new();
    let currency = data.currency;

    output.push_str(&format!("Invoice: {}\n", data.invoice_number));
    output.push_str(&format!("Date: {}\n", data.date));
    if !data.due_date.is_empty() {
        output.push_str(&format!("Payment due: {}\n", data.due_date));
    }
    output.push('\n');

    output.push_str("Supplier:\n");
    output.push_str(&format!("  {}\n", data.supplier_name));
    if !data.supplier_address.is_empty() {
        output.push_str(&format!("  {}\n", data.supplier_address));
    }
    output.push('\n');

    output.push_str("Customer:\n");
    output.push_str(&format!("  {}\n", data.customer_name));
    if !data.customer_address.is_empty() {
        output.push_str(&format!("  {}\n", data.customer_address));
    }
    output.push('\n');

    if !data.items.is_empty() {
        output.push_str("Items:\n");
        for item in &data.items {
            output.push_str(&format!(
                "  {} - {} x {} = {:.2} {}\n",
                item.name,
                item.quantity,
                item.rate,
                item.amount(),
                currency
            ));
        }
        output.push('\n');
    }

    output.push_str("Summary:\n");
    output.push_str(&format!("  Tax rate:      {}%\n", data.tax_rate));
    output.push_str(&format!("  Discount rate: {}%\n", data.discount_rate));
    if let Some(t) = totals {
        output.push_str(&format!("  Subtotal: {} {}\n", t.subtotal, currency));
        output.push_str(&format!("  Tax:      {} {}\n", t.tax_amount, currency));
        output.push_str(&format!("  Discount: {} {}\n", t.discount_amount, currency));
        output.push_str(&format!("  Total:    {} {}\n", t.total, currency));
    } else {
        output.push_str(&format!("  Total: {} {}\n", data.total_amount, currency));
    }

    output
}

/// Print missing fields to stderr.
pub fn print_validation(data: &InvoiceData) {
    let missing = data.missing_fields();
    if missing.is_empty() {
        eprintln!("{} All fields extracted", style("✓").green());
        return;
    }

    eprintln!("{}", style("Validation issues:").yellow());
    for field in missing {
        eprintln!("  - missing field: {}", field);
    }
}

/// Write to a file, or print to stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, content)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}
