//! Descriptive aggregates over cleaned listings.
//!
//! Every aggregate tolerates missing ratings and prices by leaving those
//! rows out of whatever needs the value.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::CleanedRecord;

pub const TOP_BRANDS: usize = 5;
pub const VALUE_PICKS: usize = 10;
pub const TOP_PRODUCTS: usize = 5;
pub const MIN_REVIEWS_FOR_TOP_RATED: u64 = 10;
pub const VALUE_MIN_RATING: f64 = 4.0;

/// Upper bounds of the rating bins; each bin is `(previous, upper]`.
const RATING_BIN_EDGES: [f64; 6] = [0.0, 3.0, 3.5, 4.0, 4.5, 5.0];
const RATING_BIN_LABELS: [&str; 5] = ["0-3.0", "3.0-3.5", "3.5-4.0", "4.0-4.5", "4.5-5.0"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandCount {
    pub brand: String,
    pub products: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandRating {
    pub brand: String,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBin {
    pub label: &'static str,
    pub products: usize,
    pub average_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub total_products: usize,
    pub brand_counts: Vec<BrandCount>,
    /// Percentage of products held by the top brands.
    pub top_brand_share: Option<f64>,
    pub brand_ratings: Vec<BrandRating>,
    pub rating_bins: Vec<RatingBin>,
    pub median_price: Option<f64>,
    pub value_products: Vec<CleanedRecord>,
    pub top_reviewed: Vec<CleanedRecord>,
    pub top_rated: Vec<CleanedRecord>,
}

impl Analysis {
    pub fn from_records(records: &[CleanedRecord]) -> Self {
        let brand_counts = brand_counts(records);
        let total: usize = brand_counts.iter().map(|b| b.products).sum();
        let top: usize = brand_counts.iter().take(TOP_BRANDS).map(|b| b.products).sum();
        let top_brand_share = (total > 0).then(|| 100.0 * top as f64 / total as f64);

        Self {
            total_products: records.len(),
            top_brand_share,
            brand_counts,
            brand_ratings: brand_ratings(records),
            rating_bins: rating_bins(records),
            median_price: median_price(records),
            value_products: value_products(records),
            top_reviewed: top_reviewed(records),
            top_rated: top_rated(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_products == 0
    }

    pub fn dominant_brand(&self) -> Option<&str> {
        self.brand_counts.first().map(|b| b.brand.as_str())
    }
}

/// Rows with both a rating and a price.
fn priced_and_rated(records: &[CleanedRecord]) -> impl Iterator<Item = (&CleanedRecord, f64, f64)> {
    records
        .iter()
        .filter_map(|r| Some((r, r.rating?, r.selling_price?)))
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Products per brand, most frequent first; ties by brand name.
pub fn brand_counts(records: &[CleanedRecord]) -> Vec<BrandCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.brand.as_str()).or_default() += 1;
    }
    let mut out: Vec<_> = counts
        .into_iter()
        .map(|(brand, products)| BrandCount {
            brand: brand.to_string(),
            products,
        })
        .collect();
    out.sort_by(|a, b| b.products.cmp(&a.products).then_with(|| a.brand.cmp(&b.brand)));
    out
}

/// Mean rating per brand, best first. Brands without any rating are left out.
pub fn brand_ratings(records: &[CleanedRecord]) -> Vec<BrandRating> {
    let mut ratings: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        if let Some(rating) = r.rating {
            ratings.entry(r.brand.as_str()).or_default().push(rating);
        }
    }
    let mut out: Vec<_> = ratings
        .into_iter()
        .filter_map(|(brand, values)| {
            Some(BrandRating {
                brand: brand.to_string(),
                average_rating: mean(values)?,
            })
        })
        .collect();
    out.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| a.brand.cmp(&b.brand))
    });
    out
}

fn rating_bin(rating: f64) -> Option<usize> {
    RATING_BIN_EDGES
        .windows(2)
        .position(|edge| rating > edge[0] && rating <= edge[1])
}

/// Average price per rating range. A rating of exactly 0 falls in no bin.
pub fn rating_bins(records: &[CleanedRecord]) -> Vec<RatingBin> {
    let mut prices: Vec<Vec<f64>> = vec![Vec::new(); RATING_BIN_LABELS.len()];
    for (_, rating, price) in priced_and_rated(records) {
        if let Some(bin) = rating_bin(rating) {
            prices[bin].push(price);
        }
    }
    RATING_BIN_LABELS
        .into_iter()
        .zip(prices)
        .map(|(label, values)| RatingBin {
            label,
            products: values.len(),
            average_price: mean(values),
        })
        .collect()
}

/// Median price among rows that have both a rating and a price.
pub fn median_price(records: &[CleanedRecord]) -> Option<f64> {
    let mut prices: Vec<f64> = priced_and_rated(records).map(|(_, _, p)| p).collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(f64::total_cmp);
    let mid = prices.len() / 2;
    Some(if prices.len() % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    })
}

/// Well rated and cheaper than the median, best rated first.
pub fn value_products(records: &[CleanedRecord]) -> Vec<CleanedRecord> {
    let Some(median) = median_price(records) else {
        return Vec::new();
    };
    let mut picks: Vec<_> = priced_and_rated(records)
        .filter(|(_, rating, price)| *rating >= VALUE_MIN_RATING && *price < median)
        .map(|(r, _, _)| r.clone())
        .collect();
    sort_by_rating(&mut picks);
    picks.truncate(VALUE_PICKS);
    picks
}

pub fn top_reviewed(records: &[CleanedRecord]) -> Vec<CleanedRecord> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| b.num_reviews.cmp(&a.num_reviews));
    out.truncate(TOP_PRODUCTS);
    out
}

/// Highest rated among products with enough reviews to mean something.
pub fn top_rated(records: &[CleanedRecord]) -> Vec<CleanedRecord> {
    let mut out: Vec<_> = records
        .iter()
        .filter(|r| r.num_reviews >= MIN_REVIEWS_FOR_TOP_RATED && r.rating.is_some())
        .cloned()
        .collect();
    sort_by_rating(&mut out);
    out.truncate(TOP_PRODUCTS);
    out
}

fn sort_by_rating(records: &mut [CleanedRecord]) {
    records.sort_by(|a, b| {
        let a = a.rating.unwrap_or(f64::NEG_INFINITY);
        let b = b.rating.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}
