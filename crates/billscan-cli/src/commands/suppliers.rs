//! Suppliers command - manage the supplier directory.

use clap::{Args, Subcommand};
use console::style;

use billscan_core::{NewSupplier, SupplierStore};

use super::Context;

/// Arguments for the suppliers command.
#[derive(Args)]
pub struct SuppliersArgs {
    #[command(subcommand)]
    command: SuppliersCommand,
}

#[derive(Subcommand)]
enum SuppliersCommand {
    /// Add a supplier
    Add {
        /// Supplier name
        name: String,

        /// Tax identifier
        #[arg(long, default_value = "")]
        tax_id: String,

        /// Postal address
        #[arg(long, default_value = "")]
        address: String,
    },

    /// List suppliers by name
    List {
        /// Print suppliers as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(args: SuppliersArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config).await?;

    match args.command {
        SuppliersCommand::Add {
            name,
            tax_id,
            address,
        } => {
            let supplier = store
                .add_supplier(
                    NewSupplier::new(name)
                        .with_tax_id(tax_id)
                        .with_address(address),
                )
                .await?;
            eprintln!("{} Added supplier {}", style("✓").green(), supplier.name);
            println!("{}", serde_json::to_string_pretty(&supplier)?);
            Ok(())
        }
        SuppliersCommand::List { json } => list_suppliers(&store, json).await,
    }
}

async fn list_suppliers(store: &impl SupplierStore, json: bool) -> anyhow::Result<()> {
    let suppliers = store.list_suppliers().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suppliers)?);
        return Ok(());
    }

    if suppliers.is_empty() {
        println!("{} No suppliers", style("ℹ").blue());
        return Ok(());
    }

    println!("{:<36}  {:<24}  {:<16}  {}", "ID", "NAME", "TAX ID", "ADDRESS");
    for supplier in &suppliers {
        println!(
            "{:<36}  {:<24}  {:<16}  {}",
            supplier.id, supplier.name, supplier.tax_id, supplier.address
        );
    }

    Ok(())
}
