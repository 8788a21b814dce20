//! Rule-based invoice extractor.

use serde::Serialize;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::InvoiceData;

use super::rules::{
    amounts::{extract_total_amount, parse_percentage},
    currency::detect_currency,
    items::{extract_items, DEFAULT_MAX_ITEMS},
    patterns::*,
    ExtractionMatch, ExtractionRule, Field,
};
use super::InvoiceExtractor;

/// How one field was resolved, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FieldResolution {
    pub field: Field,
    /// Winning match, or `None` when the field kept its default.
    pub resolved: Option<ExtractionMatch<String>>,
}

/// Extractor driven by the label rule table.
#[derive(Debug, Clone)]
pub struct RuleBasedExtractor {
    max_items: usize,
}

impl RuleBasedExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_max_items(config.max_items)
    }

    /// Set the maximum number of extracted items (at least one).
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Resolve every label rule and report which matcher won.
    pub fn explain(&self, text: &str) -> Vec<FieldResolution> {
        field_rules()
            .into_iter()
            .map(|rule| FieldResolution {
                field: rule.field(),
                resolved: rule.resolve(text),
            })
            .collect()
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_text(rule: &ExtractionRule, text: &str) -> String {
    rule.resolve(text).map(|m| m.value).unwrap_or_default()
}

fn resolve_rate(rule: &ExtractionRule, text: &str) -> f64 {
    rule.resolve(text)
        .map(|m| parse_percentage(&m.value))
        .unwrap_or(0.0)
}

impl InvoiceExtractor for RuleBasedExtractor {
    fn extract(&self, text: &str) -> InvoiceData {
        let total_amount = extract_total_amount(text)
            .map(|m| m.value)
            .unwrap_or_default();
        let items = extract_items(text, &total_amount, self.max_items);

        let data = InvoiceData {
            invoice_number: resolve_text(&INVOICE_NUMBER_RULE, text),
            date: resolve_text(&DATE_RULE, text),
            due_date: resolve_text(&DUE_DATE_RULE, text),
            supplier_name: resolve_text(&SUPPLIER_NAME_RULE, text),
            supplier_address: resolve_text(&SUPPLIER_ADDRESS_RULE, text),
            customer_name: resolve_text(&CUSTOMER_NAME_RULE, text),
            customer_address: String::new(),
            tax_rate: resolve_rate(&TAX_RATE_RULE, text),
            discount_rate: resolve_rate(&DISCOUNT_RATE_RULE, text),
            currency: detect_currency(text),
            total_amount,
            items,
        };

        debug!(
            "Extracted invoice '{}' ({} items, total '{}', {})",
            data.invoice_number,
            data.items.len(),
            data.total_amount,
            data.currency
        );

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{Currency, Item};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
ACME SUPPLIES LTD
Invoice #: INV-2024-001
Invoice Date: 03/15/2024
Due Date: 04/14/2024
Vendor: Acme Supplies Ltd
Address: 12 Market Street, Springfield
Bill To: Globex Corporation
Printer paper 10 4.50
Toner cartridge 2 $65.00
Tax: 8%
Discount: 5%
Total: $1,175.40
";

    #[test]
    fn test_extract_full_invoice() {
        let data = RuleBasedExtractor::new().extract(SAMPLE);

        assert_eq!(data.invoice_number, "INV-2024-001");
        assert_eq!(data.date, "03/15/2024");
        assert_eq!(data.due_date, "04/14/2024");
        assert_eq!(data.total_amount, "1175.40");
        assert_eq!(data.supplier_name, "Acme Supplies Ltd");
        assert_eq!(data.supplier_address, "12 Market Street, Springfield");
        assert_eq!(data.customer_name, "Globex Corporation");
        assert_eq!(data.customer_address, "");
        assert_eq!(data.tax_rate, 8.0);
        assert_eq!(data.discount_rate, 5.0);
        assert_eq!(data.currency, Currency::Usd);
        assert_eq!(
            data.items,
            vec![
                Item::new("Printer paper", 10, 4.5),
                Item::new("Toner cartridge", 2, 65.0),
            ]
        );
    }

    #[test]
    fn test_empty_input_defaults() {
        let data = RuleBasedExtractor::new().extract("");
        assert_eq!(data, InvoiceData::default());
    }

    #[test]
    fn test_non_invoice_text_stays_mostly_empty() {
        let data = extract_default("The quick brown fox jumps over the lazy dog.");
        assert_eq!(data.invoice_number, "");
        assert_eq!(data.total_amount, "");
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let extractor = RuleBasedExtractor::new();
        assert_eq!(extractor.extract(SAMPLE), extractor.extract(SAMPLE));
    }

    #[test]
    fn test_total_priority_follows_rule_order() {
        let data = extract_default("Total: $500\nGrand Total: $600");
        assert_eq!(data.total_amount, "500");
    }

    #[test]
    fn test_due_date_requires_label() {
        let data = extract_default("Issued 04/05/2024");
        assert_eq!(data.date, "04/05/2024");
        assert_eq!(data.due_date, "");
    }

    #[test]
    fn test_due_date_variants() {
        assert_eq!(extract_default("Payment due: 1-2-24").due_date, "1-2-24");
        assert_eq!(extract_default("Due by 12/31/2024").due_date, "12/31/2024");
    }

    #[test]
    fn test_percentage_parsing() {
        let data = extract_default("Tax: 7.5%");
        assert_eq!(data.tax_rate, 7.5);

        let data = extract_default("GST 12%\nDiscount Rate: 2.5%");
        assert_eq!(data.tax_rate, 12.0);
        assert_eq!(data.discount_rate, 2.5);
    }

    #[test]
    fn test_rate_without_percent_sign_is_ignored() {
        assert_eq!(extract_default("Tax: 7.5").tax_rate, 0.0);
    }

    #[test]
    fn test_item_synthesis_from_total() {
        let data = extract_default("Total: $120.00");
        assert_eq!(data.items, vec![Item::new("Service/Item", 1, 120.0)]);
    }

    #[test]
    fn test_receipt_number_and_currency() {
        let data = extract_default("Receipt # R-889\nAmount due: €42.10");
        assert_eq!(data.invoice_number, "R-889");
        assert_eq!(data.total_amount, "42.10");
        assert_eq!(data.currency, Currency::Eur);
    }

    #[test]
    fn test_broad_to_label_matches_customer() {
        let data = extract_default("Deliver to: Warehouse 9");
        assert_eq!(data.customer_name, "Warehouse 9");
    }

    #[test]
    fn test_custom_item_cap() {
        let text = "A 1 1\nB 2 2\nC 3 3";
        let data = RuleBasedExtractor::new().with_max_items(2).extract(text);
        assert_eq!(data.items.len(), 2);
    }

    #[test]
    fn test_zero_item_cap_still_keeps_item_lines() {
        let text = "Bolts 10 2\nTotal: $20.00";
        let data = RuleBasedExtractor::new().with_max_items(0).extract(text);
        assert_eq!(data.items, vec![Item::new("Bolts", 10, 2.0)]);
    }

    #[test]
    fn test_explain_reports_priority() {
        let resolutions = RuleBasedExtractor::new().explain("Grand total: 10\nBalance due: 20");
        let total = resolutions
            .iter()
            .find(|r| r.field == Field::TotalAmount)
            .and_then(|r| r.resolved.clone())
            .unwrap();

        assert_eq!(total.value, "10");
        assert_eq!(total.priority, 0);
        assert!(resolutions
            .iter()
            .find(|r| r.field == Field::InvoiceNumber)
            .unwrap()
            .resolved
            .is_none());
    }

    fn extract_default(text: &str) -> InvoiceData {
        RuleBasedExtractor::new().extract(text)
    }
}
