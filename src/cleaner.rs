//! Turns scraped text fields into typed values.
//!
//! `None` means "unknown" for price and rating; a missing review count is 0.
//! Cleaning is deterministic, and cleaning already-clean data changes nothing.

use std::collections::HashSet;

use crate::models::{ABSENT, CleanedRecord, SponsoredRecord, UNKNOWN};

/// Cleans and deduplicates a whole scrape. Keeps the first record seen for
/// each `(title, brand)` pair and preserves input order.
pub fn clean(records: &[SponsoredRecord]) -> Vec<CleanedRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(clean_record)
        .filter(|r| seen.insert((r.product_title.clone(), r.brand.clone())))
        .collect()
}

pub fn clean_record(record: &SponsoredRecord) -> CleanedRecord {
    CleanedRecord {
        product_title: normalize_label(&record.title).unwrap_or_else(|| UNKNOWN.to_string()),
        brand: normalize_label(&record.brand).unwrap_or_else(|| UNKNOWN.to_string()),
        rating: parse_rating(&record.rating_text),
        num_reviews: parse_review_count(&record.review_text),
        selling_price: parse_price(&record.price_text),
        image_url: record.image_url.clone(),
        product_url: record.product_url.clone(),
    }
}

/// Trimmed text, or `None` when blank or the absent marker.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == ABSENT {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `"₹1,299"` → `1299.0`. Whatever currency prefix precedes the first digit
/// is dropped. Zero is a real price; garbage is `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let amount = raw.trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-'));
    let digits: String = amount
        .chars()
        .filter(|c| !(*c == ',' || c.is_whitespace()))
        .collect();
    digits
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// `"4.3 out of 5 stars"` → `4.3`. Only the token before the first space counts.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw == ABSENT {
        return None;
    }
    raw.split(' ')
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|r| (0.0..=5.0).contains(r))
}

/// `"1,234"` → `1234`. Anything without digits counts as zero reviews.
pub fn parse_review_count(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, brand: &str) -> SponsoredRecord {
        SponsoredRecord {
            title: title.into(),
            brand: brand.into(),
            rating_text: "4.3 out of 5 stars".into(),
            review_text: "1,234".into(),
            price_text: "₹1,299".into(),
            image_url: "https://m.media-amazon.com/images/I/a.jpg".into(),
            product_url: "https://www.amazon.in/dp/A".into(),
        }
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("₹1,299"), Some(1299.0));
        assert_eq!(parse_price("₹1,299."), Some(1299.0));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("₹0"), Some(0.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("₹ 2 499"), Some(2499.0));
        assert_eq!(parse_price("nan"), None);
        assert_eq!(parse_price("-5"), None);
    }

    #[test]
    fn price_parsing_ignores_any_currency_prefix() {
        assert_eq!(parse_price("Rs.1,299"), Some(1299.0));
        assert_eq!(parse_price("US$ 15.50"), Some(15.5));
        assert_eq!(parse_price("INR 0"), Some(0.0));
        assert_eq!(parse_price("Rs."), None);
    }

    #[test]
    fn rating_parsing() {
        assert_eq!(parse_rating("4.3 out of 5 stars"), Some(4.3));
        assert_eq!(parse_rating("N/A"), None);
        assert_eq!(parse_rating("Four stars"), None);
        assert_eq!(parse_rating("7.5 out of 5"), None);
        assert_eq!(parse_rating("5"), Some(5.0));
    }

    #[test]
    fn review_parsing() {
        assert_eq!(parse_review_count("1,234"), 1234);
        assert_eq!(parse_review_count(""), 0);
        assert_eq!(parse_review_count("0"), 0);
        assert_eq!(parse_review_count("N/A"), 0);
        assert_eq!(parse_review_count("(87)"), 87);
        assert_eq!(parse_review_count("99999999999999999999999"), 0);
    }

    #[test]
    fn missing_price_is_null_but_missing_reviews_are_zero() {
        let mut record = raw("Teddy", "Frantic");
        record.price_text = ABSENT.into();
        record.review_text = "0".into();
        let cleaned = clean_record(&record);
        assert_eq!(cleaned.selling_price, None);
        assert_eq!(cleaned.num_reviews, 0);
    }

    #[test]
    fn blank_or_absent_brand_becomes_unknown() {
        assert_eq!(clean_record(&raw("Teddy", ABSENT)).brand, UNKNOWN);
        assert_eq!(clean_record(&raw("Teddy", "   ")).brand, UNKNOWN);
        assert_eq!(clean_record(&raw(ABSENT, "Frantic")).product_title, UNKNOWN);
        assert_eq!(clean_record(&raw("Teddy", "  Frantic ")).brand, "Frantic");
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let mut second_copy = raw("Teddy", "Frantic");
        second_copy.price_text = "₹999".into();
        let input = vec![
            raw("Teddy", "Frantic"),
            raw("Bunny", "Mirada"),
            second_copy,
            raw("Teddy", "Mirada"),
            raw("Bunny", " Mirada "),
        ];
        let cleaned = clean(&input);
        let keys: Vec<_> = cleaned
            .iter()
            .map(|r| (r.product_title.as_str(), r.brand.as_str()))
            .collect();
        assert_eq!(keys, [("Teddy", "Frantic"), ("Bunny", "Mirada"), ("Teddy", "Mirada")]);
        assert_eq!(cleaned[0].selling_price, Some(1299.0));
    }

    #[test]
    fn cleaning_twice_changes_nothing() {
        let mut odd = raw(" Panda ", "");
        odd.rating_text = ABSENT.into();
        odd.price_text = "₹0".into();
        odd.review_text = "".into();
        let input = vec![raw("Teddy", "Frantic"), odd, raw("Teddy", "Frantic ")];

        let once = clean(&input);
        let again: Vec<SponsoredRecord> = once.iter().cloned().map(SponsoredRecord::from).collect();
        assert_eq!(clean(&again), once);
    }

    #[test]
    fn empty_input_cleans_to_empty() {
        assert!(clean(&[]).is_empty());
    }
}
