//! Amount and numeric-token parsing.
//!
//! Recognized text is noisy, so every parser here reads the longest usable
//! numeric prefix and leaves the fallback value to the caller.

use super::{ExtractionMatch, FieldExtractor, TOTAL_AMOUNT_RULE};

/// Currency symbols that may prefix an amount.
pub const CURRENCY_SYMBOLS: [char; 4] = ['$', '৳', '€', '£'];

/// Strip thousands separators and currency symbols from a captured amount.
pub fn clean_amount(captured: &str) -> String {
    captured
        .trim()
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve the total amount through the labeled total rules.
pub fn extract_total_amount(text: &str) -> Option<ExtractionMatch<String>> {
    TOTAL_AMOUNT_RULE
        .extract(text)
        .map(|m| m.map(|value| clean_amount(&value)))
}

/// Parse the leading decimal number of `s` (`"12.5.1"` gives 12.5).
///
/// Returns `None` when `s` does not start with a digit or a `.digit` pair,
/// or when the number is too large to be finite.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the leading unsigned integer of `s` (`"3pcs"` gives 3).
pub fn parse_leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let digits = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| &s[..=i])?;

    digits.parse().ok()
}

/// Parse a captured percentage value (`"7.5"` gives 7.5); 0 on failure.
pub fn parse_percentage(captured: &str) -> f64 {
    parse_leading_float(captured.trim().trim_end_matches('%')).unwrap_or(0.0)
}
