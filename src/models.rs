use serde::{Deserialize, Serialize};

/// Placeholder for a field the listing markup did not provide.
pub const ABSENT: &str = "N/A";

/// Placeholder for a title or brand that is still missing after cleaning.
pub const UNKNOWN: &str = "Unknown";

/// A sponsored listing as scraped, every field still text.
///
/// All fields are always populated; missing values carry [`ABSENT`]
/// (or `"0"` for the review count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsoredRecord {
    #[serde(rename = "product_title")]
    pub title: String,
    pub brand: String,
    #[serde(rename = "rating")]
    pub rating_text: String,
    #[serde(rename = "num_reviews")]
    pub review_text: String,
    #[serde(rename = "selling_price")]
    pub price_text: String,
    pub image_url: String,
    pub product_url: String,
}

impl SponsoredRecord {
    pub const HEADERS: [&'static str; 7] = [
        "product_title",
        "brand",
        "rating",
        "num_reviews",
        "selling_price",
        "image_url",
        "product_url",
    ];
}

/// A listing after type coercion and defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub product_title: String,
    pub brand: String,
    pub rating: Option<f64>,
    pub num_reviews: u64,
    pub selling_price: Option<f64>,
    pub image_url: String,
    pub product_url: String,
}

impl From<CleanedRecord> for SponsoredRecord {
    /// Renders canonical values back to their textual form, so that a cleaned
    /// record can be fed through the cleaner again.
    fn from(record: CleanedRecord) -> Self {
        SponsoredRecord {
            title: record.product_title,
            brand: record.brand,
            rating_text: record
                .rating
                .map_or_else(|| ABSENT.to_string(), |r| r.to_string()),
            review_text: record.num_reviews.to_string(),
            price_text: record
                .selling_price
                .map_or_else(|| ABSENT.to_string(), |p| p.to_string()),
            image_url: record.image_url,
            product_url: record.product_url,
        }
    }
}
