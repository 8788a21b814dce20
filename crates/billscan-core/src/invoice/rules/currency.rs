//! Currency detection by symbol and code scan.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::invoice::Currency;

use super::{ExtractionMatch, FieldExtractor};

lazy_static! {
    // ASCII-only case folding keeps match offsets on the original text
    static ref CODE_PATTERNS: Vec<Regex> = Currency::ALL
        .iter()
        .map(|currency| Regex::new(&format!("(?i-u){}", currency.code())).unwrap())
        .collect();
}

/// Scans text for currency symbols or codes in fixed priority order.
pub struct CurrencyDetector;

impl CurrencyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyDetector {
    type Output = ExtractionMatch<Currency>;

    /// The first currency in `Currency::ALL` order whose symbol or
    /// (case-insensitive) code occurs anywhere in the text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        Currency::ALL.into_iter().enumerate().find_map(|(priority, currency)| {
            let symbol = currency.symbol();

            let (start, end) = match text.find(symbol) {
                Some(start) => (start, start + symbol.len_utf8()),
                None => {
                    let m = CODE_PATTERNS[priority].find(text)?;
                    (m.start(), m.end())
                }
            };

            let source = &text[start..end];
            Some(ExtractionMatch::new(currency, priority, source).with_position(start, end))
        })
    }
}

/// Detect the invoice currency, defaulting to USD.
pub fn detect_currency(text: &str) -> Currency {
    CurrencyDetector::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_usd() {
        assert_eq!(detect_currency(""), Currency::Usd);
        assert_eq!(detect_currency("no money here"), Currency::Usd);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(detect_currency("Total ৳500"), Currency::Bdt);
        assert_eq!(detect_currency("Total €500"), Currency::Eur);
        assert_eq!(detect_currency("Total £500"), Currency::Gbp);
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        assert_eq!(detect_currency("Amount in Bdt"), Currency::Bdt);
        assert_eq!(detect_currency("500 GBP"), Currency::Gbp);
    }

    #[test]
    fn test_priority_is_fixed_not_positional() {
        assert_eq!(detect_currency("€10 then $20"), Currency::Usd);
        assert_eq!(detect_currency("£10 and EUR 5"), Currency::Eur);
    }

    #[test]
    fn test_code_position_points_into_original_text() {
        // 'İ' lowercases to three bytes, so offsets must come from the source
        let text = "İSTANBUL İŞ Eur 5";
        let m = CurrencyDetector::new().extract(text).unwrap();
        let (start, end) = m.position.unwrap();

        assert_eq!(m.value, Currency::Eur);
        assert_eq!(&text[start..end], "Eur");
        assert_eq!(m.source, "Eur");
    }

    #[test]
    fn test_symbol_position() {
        let m = CurrencyDetector::new().extract("Paid ৳500").unwrap();
        assert_eq!(m.position, Some((5, 8)));
        assert_eq!(m.source, "৳");
    }
}
