//! Invoice data model produced by field extraction.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured invoice fields resolved from recognized text.
///
/// Every field has a zero-value default, so a record is always complete
/// even when nothing in the source text matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceData {
    /// Invoice/bill/receipt identifier.
    pub invoice_number: String,

    /// Issue date as it appeared in the text (not normalized).
    pub date: String,

    /// Payment due date as it appeared in the text (not normalized).
    pub due_date: String,

    /// Total with thousands separators removed, e.g. `"1234.56"`.
    pub total_amount: String,

    pub supplier_name: String,
    pub supplier_address: String,
    pub customer_name: String,

    /// Never filled by extraction; kept for manually edited records.
    pub customer_address: String,

    /// Line items, at most five when extracted.
    pub items: Vec<Item>,

    /// Tax rate in percent (7.5 means 7.5%).
    pub tax_rate: f64,

    /// Discount rate in percent.
    pub discount_rate: f64,

    pub currency: Currency,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
    pub rate: f64,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u32, rate: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            rate,
        }
    }

    /// Line amount (`quantity * rate`), saturating at `Decimal::MAX`.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(to_decimal(self.rate))
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new("Item", 1, 0.0)
    }
}

/// Supported invoice currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Bdt,
    Eur,
    Gbp,
}

impl Currency {
    /// All currencies in detection priority order.
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Bdt, Currency::Eur, Currency::Gbp];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Bdt => "BDT",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> char {
        match self {
            Currency::Usd => '$',
            Currency::Bdt => '৳',
            Currency::Eur => '€',
            Currency::Gbp => '£',
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code) || code.starts_with(c.symbol()))
            .ok_or_else(|| format!("unknown currency: '{code}'"))
    }
}

/// Derived totals for an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceData {
    /// Compute subtotal, tax, discount and grand total from the line items.
    ///
    /// Arithmetic saturates at the bounds of `Decimal` instead of
    /// overflowing, so absurd recognized amounts yield `Decimal::MAX`.
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal = self
            .items
            .iter()
            .map(Item::amount)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let tax_amount = percent_of(subtotal, self.tax_rate);
        let discount_amount = percent_of(subtotal, self.discount_rate);

        InvoiceTotals {
            subtotal: to_money(subtotal),
            tax_amount: to_money(tax_amount),
            discount_amount: to_money(discount_amount),
            total: to_money(
                subtotal
                    .saturating_add(tax_amount)
                    .saturating_sub(discount_amount),
            ),
        }
    }

    /// Names of the fields that are still at their zero-value default.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let text_fields = [
            ("invoice_number", &self.invoice_number),
            ("date", &self.date),
            ("due_date", &self.due_date),
            ("total_amount", &self.total_amount),
            ("supplier_name", &self.supplier_name),
            ("supplier_address", &self.supplier_address),
            ("customer_name", &self.customer_name),
            ("customer_address", &self.customer_address),
        ];

        let mut missing: Vec<&'static str> = text_fields
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

        if self.items.is_empty() {
            missing.push("items");
        }

        missing
    }

    /// Total amount as a decimal, ignoring characters other than digits and `.`.
    pub fn total_amount_decimal(&self) -> Option<Decimal> {
        let cleaned: String = self
            .total_amount
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        Decimal::from_str(&cleaned).ok()
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default()
}

fn percent_of(amount: Decimal, rate: f64) -> Decimal {
    amount.saturating_mul(to_decimal(rate)) / Decimal::ONE_HUNDRED
}

/// Round to cents, always keeping two decimal places.
fn to_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_record() {
        let data = InvoiceData::default();
        assert_eq!(data.invoice_number, "");
        assert_eq!(data.currency, Currency::Usd);
        assert_eq!(data.tax_rate, 0.0);
        assert!(data.items.is_empty());
    }

    #[test]
    fn test_totals_with_tax_and_discount() {
        let data = InvoiceData {
            items: vec![Item::new("Widget", 2, 50.0), Item::new("Setup", 1, 100.0)],
            tax_rate: 10.0,
            discount_rate: 5.0,
            ..Default::default()
        };

        let totals = data.totals();
        assert_eq!(totals.subtotal, Decimal::new(20000, 2));
        assert_eq!(totals.tax_amount, Decimal::new(2000, 2));
        assert_eq!(totals.discount_amount, Decimal::new(1000, 2));
        assert_eq!(totals.total, Decimal::new(21000, 2));
        assert_eq!(totals.total.to_string(), "210.00");
    }

    #[test]
    fn test_totals_fractional_rate() {
        let data = InvoiceData {
            items: vec![Item::new("Hours", 3, 33.5)],
            tax_rate: 7.5,
            ..Default::default()
        };

        let totals = data.totals();
        assert_eq!(totals.subtotal, Decimal::new(10050, 2));
        assert_eq!(totals.tax_amount, Decimal::new(754, 2));
        assert_eq!(totals.total, Decimal::new(10804, 2));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let data = InvoiceData {
            items: vec![Item::new("Widget", 10, 1e28), Item::new("Bolt", 1, 5.0)],
            tax_rate: 10.0,
            ..Default::default()
        };

        assert_eq!(data.items[0].amount(), Decimal::MAX);
        let totals = data.totals();
        assert!(totals.subtotal > Decimal::ZERO);
        assert!(totals.total >= totals.subtotal);
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!("EUR".parse::<Currency>(), Ok(Currency::Eur));
        assert_eq!("৳".parse::<Currency>(), Ok(Currency::Bdt));
        assert!("PLN".parse::<Currency>().is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let data = InvoiceData {
            invoice_number: "INV-7".to_string(),
            currency: Currency::Gbp,
            ..Default::default()
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["invoice_number"], "INV-7");
        assert_eq!(json["currency"], "GBP");
        assert_eq!(json["items"], serde_json::json!([]));
    }

    #[test]
    fn test_partial_record_deserializes_with_defaults() {
        let data: InvoiceData =
            serde_json::from_str(r#"{"invoice_number": "A-1", "tax_rate": 5}"#).unwrap();
        assert_eq!(data.invoice_number, "A-1");
        assert_eq!(data.tax_rate, 5.0);
        assert_eq!(data.currency, Currency::Usd);
        assert_eq!(data.total_amount, "");
    }

    #[test]
    fn test_missing_fields() {
        let data = InvoiceData {
            invoice_number: "X".to_string(),
            items: vec![Item::default()],
            ..Default::default()
        };

        let missing = data.missing_fields();
        assert!(!missing.contains(&"invoice_number"));
        assert!(!missing.contains(&"items"));
        assert!(missing.contains(&"due_date"));
    }

    #[test]
    fn test_total_amount_decimal_strips_formatting() {
        let mut data = InvoiceData::default();
        assert_eq!(data.total_amount_decimal(), None);

        data.total_amount = "$1,200.50".to_string();
        assert_eq!(data.total_amount_decimal(), Some(Decimal::new(120050, 2)));
    }
}
