use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pacing::JitterWindow;

pub const DEFAULT_BASE_URL: &str = "https://www.amazon.in";

/// How often, and how patiently, a page fetch is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: JitterWindow,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: JitterWindow::from_secs(3, 7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Origin that search URLs are built on and product links resolve against.
    pub base_url: Url,
    pub retry: RetryPolicy,
    /// Pause between consecutive result pages.
    pub page_delay: JitterWindow,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    /// Prepended to the scraped whole-price text.
    pub currency_symbol: String,
    pub selectors: SelectorConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            retry: RetryPolicy::default(),
            page_delay: JitterWindow::from_secs(2, 5),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            currency_symbol: "₹".to_string(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors for one search-results layout.
///
/// The site's markup drifts independently of this crate, so everything
/// structural lives here and can be replaced from a JSON file. Per-field
/// lists are tried in order; the first selector that yields text wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub result_block: String,
    pub sponsored_label: String,
    pub sponsored_label_text: String,
    /// Matched case-insensitively against every attribute value of a block.
    pub sponsored_attr_needle: String,
    pub sponsored_badge: String,
    pub title: Vec<String>,
    pub product_link: Vec<String>,
    pub brand: Vec<String>,
    pub rating: Vec<String>,
    pub reviews: Vec<String>,
    pub price_whole: Vec<String>,
    pub image: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result_block: r#"div[data-component-type="s-search-result"]"#.into(),
            sponsored_label: "span.s-label-popover-default .a-color-secondary".into(),
            sponsored_label_text: "Sponsored".into(),
            sponsored_attr_needle: "sponsor".into(),
            sponsored_badge: ".puis-sponsored-label-text".into(),
            title: vec!["h2 a.a-link-normal span".into()],
            product_link: vec!["h2 a.a-link-normal".into()],
            // store-link layout first, plain-text layout second
            brand: vec![".a-size-base.a-color-secondary".into(), "h5 .a-size-base".into()],
            rating: vec!["i.a-icon-star-small span".into()],
            reviews: vec!["span.a-size-base.s-underline-text".into()],
            price_whole: vec![".a-price-whole".into()],
            image: vec!["img.s-image".into()],
        }
    }
}

pub fn load_selectors(path: &Path) -> Result<SelectorConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading selector file {}", path.display()))?;
    let selectors = serde_json::from_str(&json)
        .with_context(|| format!("parsing selector file {}", path.display()))?;
    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_selector_file_keeps_defaults() {
        let parsed: SelectorConfig =
            serde_json::from_str(r#"{ "brand": ["span.brand-name"] }"#).unwrap();
        assert_eq!(parsed.brand, vec!["span.brand-name".to_string()]);
        assert_eq!(parsed.title, SelectorConfig::default().title);
        assert_eq!(parsed.sponsored_label_text, "Sponsored");
    }

    #[test]
    fn defaults_match_documented_pacing() {
        let config = ScrapeConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff.min(), Duration::from_secs(3));
        assert_eq!(config.retry.backoff.max(), Duration::from_secs(7));
        assert_eq!(config.page_delay.min(), Duration::from_secs(2));
        assert_eq!(config.page_delay.max(), Duration::from_secs(5));
    }
}
