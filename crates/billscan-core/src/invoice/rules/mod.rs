//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod currency;
pub mod items;
pub mod patterns;

pub use amounts::{clean_amount, parse_leading_float, parse_leading_int, parse_percentage};
pub use currency::{detect_currency, CurrencyDetector};
pub use items::{extract_items, is_item_line, ItemExtractor};
pub use patterns::*;

use std::fmt;

use regex::Regex;
use serde::Serialize;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// Invoice fields resolved through label rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    InvoiceNumber,
    Date,
    DueDate,
    TotalAmount,
    SupplierName,
    SupplierAddress,
    CustomerName,
    TaxRate,
    DiscountRate,
}

impl Field {
    /// Field name as it appears in the serialized invoice.
    pub fn name(&self) -> &'static str {
        match self {
            Field::InvoiceNumber => "invoice_number",
            Field::Date => "date",
            Field::DueDate => "due_date",
            Field::TotalAmount => "total_amount",
            Field::SupplierName => "supplier_name",
            Field::SupplierAddress => "supplier_address",
            Field::CustomerName => "customer_name",
            Field::TaxRate => "tax_rate",
            Field::DiscountRate => "discount_rate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One candidate pattern and the capture group holding the value.
#[derive(Debug)]
pub struct Matcher {
    pattern: Regex,
    group: usize,
}

impl Matcher {
    /// Compile a matcher. Panics on an invalid pattern.
    pub fn new(pattern: &str, group: usize) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            group,
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// First match of this pattern whose capture is non-empty after trimming.
    fn find(&self, text: &str) -> Option<(String, usize, usize, String)> {
        self.pattern.captures_iter(text).find_map(|caps| {
            let value = caps.get(self.group)?.as_str().trim();
            if value.is_empty() {
                return None;
            }
            let full_match = caps.get(0)?;
            Some((
                value.to_string(),
                full_match.start(),
                full_match.end(),
                full_match.as_str().to_string(),
            ))
        })
    }
}

/// Ordered candidate matchers for one field; first match wins.
#[derive(Debug)]
pub struct ExtractionRule {
    field: Field,
    matchers: Vec<Matcher>,
}

impl ExtractionRule {
    pub fn new(field: Field, patterns: &[(&str, usize)]) -> Self {
        Self {
            field,
            matchers: patterns
                .iter()
                .map(|&(pattern, group)| Matcher::new(pattern, group))
                .collect(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Resolve the field, or `None` when no matcher captures anything.
    pub fn resolve(&self, text: &str) -> Option<ExtractionMatch<String>> {
        self.extract(text)
    }
}

impl FieldExtractor for ExtractionRule {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.matchers.iter().enumerate().find_map(|(priority, matcher)| {
            matcher.find(text).map(|(value, start, end, source)| {
                ExtractionMatch::new(value, priority, source).with_position(start, end)
            })
        })
    }
}

/// A resolved value with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the winning matcher in its rule (0 = highest priority).
    pub priority: usize,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, priority: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            priority,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            priority: self.priority,
            position: self.position,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_matcher_wins_over_later_text_position() {
        let rule = ExtractionRule::new(
            Field::TotalAmount,
            &[(r"(?i)total\s*:?\s*(\d+)", 1), (r"(?i)due\s*:?\s*(\d+)", 1)],
        );

        let m = rule.resolve("Due: 10\nTotal: 20").unwrap();
        assert_eq!(m.value, "20");
        assert_eq!(m.priority, 0);
    }

    #[test]
    fn test_falls_through_to_lower_priority() {
        let rule = ExtractionRule::new(
            Field::TotalAmount,
            &[(r"(?i)total\s*:?\s*(\d+)", 1), (r"(?i)due\s*:?\s*(\d+)", 1)],
        );

        let m = rule.resolve("Due: 10").unwrap();
        assert_eq!(m.value, "10");
        assert_eq!(m.priority, 1);
        assert_eq!(m.source, "Due: 10");
        assert_eq!(m.position, Some((0, 7)));
    }

    #[test]
    fn test_blank_capture_does_not_count() {
        let rule = ExtractionRule::new(Field::SupplierName, &[(r"(?i)vendor([^\n]*)", 1)]);
        assert_eq!(rule.resolve("vendor   \nvendor Acme").unwrap().value, "Acme");
        assert!(rule.resolve("vendor").is_none());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::InvoiceNumber.to_string(), "invoice_number");
        assert_eq!(Field::DiscountRate.name(), "discount_rate");
    }
}
