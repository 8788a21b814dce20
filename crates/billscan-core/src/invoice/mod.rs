//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{FieldResolution, RuleBasedExtractor};

use crate::models::invoice::InvoiceData;

/// Trait for invoice field extractors.
///
/// Extraction is total: every input, including empty or non-invoice text,
/// yields a complete record with defaults for unmatched fields.
pub trait InvoiceExtractor: Send + Sync {
    /// Extract invoice data from recognized text.
    fn extract(&self, text: &str) -> InvoiceData;
}

/// Extract invoice data with the default rule set.
pub fn extract(text: &str) -> InvoiceData {
    RuleBasedExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{Currency, Item};

    #[test]
    fn test_extract_defaults_for_empty_text() {
        let data = extract("");
        assert_eq!(data.invoice_number, "");
        assert_eq!(data.currency, Currency::Usd);
        assert_eq!(data.tax_rate, 0.0);
        assert_eq!(data.discount_rate, 0.0);
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_currency_priority_dollar_over_euro() {
        assert_eq!(extract("Total: €50 ($54)").currency, Currency::Usd);
    }

    #[test]
    fn test_eight_item_lines_yield_first_five() {
        let text = "\
Bolt 1 1
Nut 2 2
Washer 3 3
Screw 4 4
Rivet 5 5
Pin 6 6
Clip 7 7
Hook 8 8";

        let names: Vec<String> = extract(text).items.into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Bolt", "Nut", "Washer", "Screw", "Rivet"]);
    }

    #[test]
    fn test_synthesized_item_keeps_cents() {
        assert_eq!(
            extract("Total: $120.00").items,
            vec![Item::new("Service/Item", 1, 120.0)]
        );
    }

    #[test]
    fn test_huge_item_rate_totals_do_not_panic() {
        let data = extract("Widget 10 10000000000000000000000000000");
        assert_eq!(data.items, vec![Item::new("Widget", 10, 1e28)]);

        let totals = data.totals();
        assert_eq!(data.items[0].amount(), rust_decimal::Decimal::MAX);
        assert!(totals.total > rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_non_ascii_digits_are_not_amounts() {
        let data = extract("Total: ১২০\nDate: ০৪/০৫/২০২৪");
        assert_eq!(data.total_amount, "");
        assert_eq!(data.date, "");
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_overflowing_numbers_become_zero() {
        let nines = "9".repeat(400);
        let data = extract(&format!("Widget 2 {nines}\nTax: {nines}%"));
        assert_eq!(data.items, vec![Item::new("Widget", 2, 0.0)]);
        assert_eq!(data.tax_rate, 0.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_extraction_is_consistent() {
        let text = "Invoice # C-77\nTotal: $99.99\nWidget 3 33.33";
        let expected = extract(text);

        let handles: Vec<_> = (0..16)
            .map(|_| tokio::task::spawn_blocking(move || extract(text)))
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), expected);
        }
    }
}
