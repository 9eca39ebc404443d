use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{ConfigError, ExtractError};
use crate::models::{ABSENT, SponsoredRecord};
use crate::selectors::ListingSelectors;

/// Pulls sponsored listings out of one search-results page.
#[derive(Debug)]
pub struct ListingParser {
    selectors: ListingSelectors,
    base_url: Url,
    currency_symbol: String,
}

impl ListingParser {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors: ListingSelectors::compile(&config.selectors)?,
            base_url: config.base_url.clone(),
            currency_symbol: config.currency_symbol.clone(),
        })
    }

    /// Sponsored records in document order. Non-sponsored cards are skipped
    /// silently; a card that fails to read is dropped with a warning.
    pub fn parse_sponsored(&self, html: &str) -> Vec<SponsoredRecord> {
        let doc = Html::parse_document(html);
        let mut records = Vec::new();
        let mut cards = 0usize;

        for block in doc.select(&self.selectors.block) {
            cards += 1;
            if !self.selectors.is_sponsored(block) {
                continue;
            }
            match self.extract_record(block) {
                Ok(record) => records.push(record),
                Err(e) => warn!("discarding listing: {e}"),
            }
        }

        debug!(cards, sponsored = records.len(), "parsed result page");
        records
    }

    pub fn extract_record(&self, block: ElementRef<'_>) -> Result<SponsoredRecord, ExtractError> {
        let s = &self.selectors;
        let or_absent = |value: Option<String>| value.unwrap_or_else(|| ABSENT.to_string());

        let product_url = match s.product_link.resolve(block) {
            Some(href) => self
                .base_url
                .join(&href)
                .map_err(|source| ExtractError::ProductUrl { href, source })?
                .to_string(),
            None => ABSENT.to_string(),
        };

        let price_text = s
            .price_whole
            .resolve(block)
            .map(|whole| format!("{}{}", self.currency_symbol, whole));

        Ok(SponsoredRecord {
            title: or_absent(s.title.resolve(block)),
            brand: or_absent(s.brand.resolve(block)),
            rating_text: or_absent(s.rating.resolve(block)),
            review_text: s.reviews.resolve(block).unwrap_or_else(|| "0".to_string()),
            price_text: or_absent(price_text),
            image_url: or_absent(s.image.resolve(block)),
            product_url,
        })
    }
}
