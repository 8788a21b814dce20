//! Line item extraction from item-shaped text lines.

use tracing::debug;

use crate::models::invoice::Item;

use super::amounts::{parse_leading_float, parse_leading_int};
use super::patterns::{ITEM_QTY_AT_RATE, ITEM_QTY_RATE, ITEM_QTY_TIMES_RATE};
use super::FieldExtractor;

/// Default cap on extracted items.
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// Name used for items whose line carries no descriptive tokens.
pub const DEFAULT_ITEM_NAME: &str = "Item";

/// Name of the item synthesized from the invoice total.
pub const FALLBACK_ITEM_NAME: &str = "Service/Item";

/// Line item extractor.
pub struct ItemExtractor {
    max_items: usize,
}

impl ItemExtractor {
    pub fn new() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Cap on kept item lines; a cap of zero is raised to one.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = Vec<Item>;

    /// Items from the first qualifying lines, in text order.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let items: Vec<Item> = text
            .lines()
            .filter(|line| is_item_line(line))
            .take(self.max_items)
            .map(parse_item_line)
            .collect();

        debug!("Found {} item lines", items.len());

        if items.is_empty() { None } else { Some(items) }
    }
}

/// Whether a line has a `qty x rate`, `qty @ rate` or `qty rate` shape.
pub fn is_item_line(line: &str) -> bool {
    ITEM_QTY_TIMES_RATE.is_match(line)
        || ITEM_QTY_AT_RATE.is_match(line)
        || ITEM_QTY_RATE.is_match(line)
}

/// Split an item line into name, quantity and rate.
///
/// The last token is the rate, the one before it the quantity, and
/// everything earlier the name.
pub fn parse_item_line(line: &str) -> Item {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let n = tokens.len();

    let rate = tokens
        .last()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect::<String>()
        })
        .and_then(|digits| parse_leading_float(&digits))
        .unwrap_or(0.0);

    let quantity = n
        .checked_sub(2)
        .and_then(|i| parse_leading_int(tokens[i]))
        .filter(|&q| q > 0)
        .unwrap_or(1);

    let name = tokens[..n.saturating_sub(2)].join(" ");
    let name = if name.is_empty() {
        DEFAULT_ITEM_NAME.to_string()
    } else {
        name
    };

    Item::new(name, quantity, rate)
}

/// Extract items; when none are found, synthesize one from the total.
pub fn extract_items(text: &str, total_amount: &str, max_items: usize) -> Vec<Item> {
    if let Some(items) = ItemExtractor::new().with_max_items(max_items).extract(text) {
        return items;
    }

    if total_amount.is_empty() {
        return Vec::new();
    }

    let rate = parse_leading_float(total_amount).unwrap_or(0.0);
    vec![Item::new(FALLBACK_ITEM_NAME, 1, rate)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_item_line() {
        assert_eq!(
            parse_item_line("Web design 3 150.00"),
            Item::new("Web design", 3, 150.0)
        );
    }

    #[test]
    fn test_parse_times_line_keeps_quantity_token_in_name() {
        // "x" sits in the quantity slot, so quantity falls back to 1
        assert_eq!(
            parse_item_line("Widget 2 x $10.50"),
            Item::new("Widget 2", 1, 10.5)
        );
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_item_line("2 x"), Item::new("Item", 2, 0.0));
        assert_eq!(parse_item_line("0 12"), Item::new("Item", 1, 12.0));
        assert_eq!(parse_item_line("3x4"), Item::new("Item", 1, 34.0));
    }

    #[test]
    fn test_extract_caps_items() {
        let text = (1..=8)
            .map(|i| format!("Part{i} {i} {}", i * 10))
            .collect::<Vec<_>>()
            .join("\n");

        let items = extract_items(&text, "", DEFAULT_MAX_ITEMS);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], Item::new("Part1", 1, 10.0));
        assert_eq!(items[4], Item::new("Part5", 5, 50.0));
    }

    #[test]
    fn test_synthesized_item_from_total() {
        assert_eq!(
            extract_items("Total: $120.00", "120.00", DEFAULT_MAX_ITEMS),
            vec![Item::new(FALLBACK_ITEM_NAME, 1, 120.0)]
        );
    }

    #[test]
    fn test_zero_cap_does_not_force_synthesis() {
        assert_eq!(
            extract_items("Bolts 10 2\nTotal: $20.00", "20.00", 0),
            vec![Item::new("Bolts", 10, 2.0)]
        );
    }

    #[test]
    fn test_overflowing_rate_falls_back_to_zero() {
        let line = format!("Widget 2 {}", "9".repeat(400));
        assert_eq!(parse_item_line(&line), Item::new("Widget", 2, 0.0));
    }

    #[test]
    fn test_no_items_and_no_total() {
        assert!(extract_items("Thank you for your business", "", DEFAULT_MAX_ITEMS).is_empty());
    }
}
