//! Price text parsing.
//!
//! Listing prices look like "55,000৳" or "৳55,000". Products without a
//! published price show the "TBA" placeholder, which maps to None.

/// Placeholder the catalog shows instead of a price.
pub const UNAVAILABLE: &str = "TBA";

const CURRENCY_SYMBOLS: &[char] = &['৳', '$', '€', '£', '₹'];

/// Parse listing price text into whole currency units.
///
/// Returns None for the unavailable placeholder, empty text, and anything
/// that is not an integer once symbols and separators are removed.
pub fn parse_price(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNAVAILABLE) {
        return None;
    }

    let digits: String = trimmed
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    digits.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taka_prefix_and_separators() {
        assert_eq!(parse_price("৳55,000"), Some(55000));
    }

    #[test]
    fn taka_suffix_as_rendered_on_listing() {
        assert_eq!(parse_price("1,25,500৳"), Some(125500));
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert_eq!(parse_price("  ৳ 9,999 \n"), Some(9999));
    }

    #[test]
    fn placeholder_is_unknown() {
        assert_eq!(parse_price("TBA"), None);
        assert_eq!(parse_price(" tba "), None);
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price("৳"), None);
        assert_eq!(parse_price("55.000,50"), None);
        assert_eq!(parse_price("99999999999999999999999"), None);
    }
}
