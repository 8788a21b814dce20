//! Label rules and line-shape patterns for invoice extraction.
//!
//! Each rule lists its candidate patterns in priority order; the first one
//! that captures a non-empty value decides the field. Digits are ASCII only.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionRule, Field};

lazy_static! {
    // Invoice number: label, optional '#' and ':', then an alphanumeric/hyphen token
    pub static ref INVOICE_NUMBER_RULE: ExtractionRule = ExtractionRule::new(
        Field::InvoiceNumber,
        &[
            (r"(?i)invoice\s*#?\s*:?\s*([a-z0-9\-]+)", 1),
            (r"(?i)inv\s*#?\s*:?\s*([a-z0-9\-]+)", 1),
            (r"(?i)invoice\s+no\.?\s*:?\s*([a-z0-9\-]+)", 1),
            (r"(?i)bill\s*#?\s*:?\s*([a-z0-9\-]+)", 1),
            (r"(?i)receipt\s*#?\s*:?\s*([a-z0-9\-]+)", 1),
        ],
    );

    // Issue date; the unlabeled numeric date is the last resort
    pub static ref DATE_RULE: ExtractionRule = ExtractionRule::new(
        Field::Date,
        &[
            (r"(?i)date\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
            (r"(?i)invoice\s+date\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
            (r"(?i)issue\s+date\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
            (r"([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
        ],
    );

    // Due date must carry a label
    pub static ref DUE_DATE_RULE: ExtractionRule = ExtractionRule::new(
        Field::DueDate,
        &[
            (r"(?i)due\s+date\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
            (r"(?i)payment\s+due\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
            (r"(?i)due\s+by\s*:?\s*([0-9]{1,2}[/\-][0-9]{1,2}[/\-][0-9]{2,4})", 1),
        ],
    );

    // Totals: optional currency symbol, comma-grouped digits, optional cents
    pub static ref TOTAL_AMOUNT_RULE: ExtractionRule = ExtractionRule::new(
        Field::TotalAmount,
        &[
            (r"(?i)total\s*:?\s*[$৳€£]?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?)", 1),
            (r"(?i)grand\s+total\s*:?\s*[$৳€£]?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?)", 1),
            (r"(?i)amount\s+due\s*:?\s*[$৳€£]?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?)", 1),
            (r"(?i)balance\s+due\s*:?\s*[$৳€£]?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?)", 1),
            (r"(?i)net\s+amount\s*:?\s*[$৳€£]?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{2})?)", 1),
        ],
    );

    // Party names capture the rest of the line
    pub static ref SUPPLIER_NAME_RULE: ExtractionRule = ExtractionRule::new(
        Field::SupplierName,
        &[
            (r"(?i)supplier\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)from\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)company\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)vendor\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)seller\s*:?\s*([^\n\r]+)", 1),
        ],
    );

    pub static ref CUSTOMER_NAME_RULE: ExtractionRule = ExtractionRule::new(
        Field::CustomerName,
        &[
            (r"(?i)bill\s+to\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)customer\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)client\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)to\s*:?\s*([^\n\r]+)", 1),
        ],
    );

    // Only the supplier side has an address rule
    pub static ref SUPPLIER_ADDRESS_RULE: ExtractionRule = ExtractionRule::new(
        Field::SupplierAddress,
        &[
            (r"(?i)address\s*:?\s*([^\n\r]+)", 1),
            (r"(?i)location\s*:?\s*([^\n\r]+)", 1),
        ],
    );

    // Percentages: the number must be directly followed by '%'
    pub static ref TAX_RATE_RULE: ExtractionRule = ExtractionRule::new(
        Field::TaxRate,
        &[
            (r"(?i)tax\s*:?\s*([0-9]+(?:\.[0-9]+)?)%", 1),
            (r"(?i)vat\s*:?\s*([0-9]+(?:\.[0-9]+)?)%", 1),
            (r"(?i)gst\s*:?\s*([0-9]+(?:\.[0-9]+)?)%", 1),
        ],
    );

    pub static ref DISCOUNT_RATE_RULE: ExtractionRule = ExtractionRule::new(
        Field::DiscountRate,
        &[
            (r"(?i)discount\s*:?\s*([0-9]+(?:\.[0-9]+)?)%", 1),
            (r"(?i)discount\s+rate\s*:?\s*([0-9]+(?:\.[0-9]+)?)%", 1),
        ],
    );

    // Item line shapes: "2 x $10", "2 @ 10", "2 10"
    pub static ref ITEM_QTY_TIMES_RATE: Regex = Regex::new(
        r"[0-9]+\s*[x×]\s*[$৳€£]?\s*[0-9]+"
    ).unwrap();

    pub static ref ITEM_QTY_AT_RATE: Regex = Regex::new(
        r"[0-9]+\s*@\s*[$৳€£]?\s*[0-9]+"
    ).unwrap();

    pub static ref ITEM_QTY_RATE: Regex = Regex::new(
        r"[0-9]+(?:\s+[$৳€£]?|\s*[$৳€£])\s*[0-9]+"
    ).unwrap();
}

/// Every label rule, in the order fields are resolved.
pub fn field_rules() -> [&'static ExtractionRule; 9] {
    [
        &*INVOICE_NUMBER_RULE,
        &*DATE_RULE,
        &*DUE_DATE_RULE,
        &*TOTAL_AMOUNT_RULE,
        &*SUPPLIER_NAME_RULE,
        &*CUSTOMER_NAME_RULE,
        &*SUPPLIER_ADDRESS_RULE,
        &*TAX_RATE_RULE,
        &*DISCOUNT_RATE_RULE,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        for rule in field_rules() {
            assert!(!rule.matchers().is_empty(), "{} has no matchers", rule.field());
        }
    }

    #[test]
    fn test_item_shapes() {
        assert!(ITEM_QTY_TIMES_RATE.is_match("Widget 2 x $10"));
        assert!(ITEM_QTY_TIMES_RATE.is_match("Cable 3×4"));
        assert!(ITEM_QTY_AT_RATE.is_match("Bolts 10 @ 2"));
        assert!(ITEM_QTY_RATE.is_match("Consulting 3 150"));
        assert!(ITEM_QTY_RATE.is_match("Paper 4 €12"));
    }

    #[test]
    fn test_single_numbers_are_not_items() {
        for line in ["Total: $120.00", "Date: 04/05/2024", "Invoice #: INV-001"] {
            assert!(!ITEM_QTY_TIMES_RATE.is_match(line), "{line}");
            assert!(!ITEM_QTY_AT_RATE.is_match(line), "{line}");
            assert!(!ITEM_QTY_RATE.is_match(line), "{line}");
        }
    }

    #[test]
    fn test_non_ascii_digits_do_not_match() {
        assert!(TOTAL_AMOUNT_RULE.resolve("Total: ১২০").is_none());
        assert!(DATE_RULE.resolve("Date: ০৪/০৫/২০২৪").is_none());
        assert!(TAX_RATE_RULE.resolve("VAT: ٥%").is_none());
        assert!(!ITEM_QTY_RATE.is_match("Rice ২ ১২০"));
    }
}
