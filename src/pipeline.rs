use tracing::{info, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ConfigError;
use crate::fetcher::Fetch;
use crate::models::SponsoredRecord;
use crate::pacing::{JitterWindow, Pacer};
use crate::parser::ListingParser;

/// Observes every page body that was fetched successfully.
pub trait PageHook {
    fn page_fetched(&self, page: u32, url: &Url, markup: &str);
}

/// Walks search-result pages one at a time and collects sponsored listings.
pub struct Scraper<F, P> {
    fetcher: F,
    pacer: P,
    parser: ListingParser,
    base_url: Url,
    page_delay: JitterWindow,
    hook: Option<Box<dyn PageHook>>,
}

impl<F: Fetch, P: Pacer> Scraper<F, P> {
    pub fn new(config: &ScrapeConfig, fetcher: F, pacer: P) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher,
            pacer,
            parser: ListingParser::new(config)?,
            base_url: config.base_url.clone(),
            page_delay: config.page_delay,
            hook: None,
        })
    }

    pub fn with_hook(mut self, hook: impl PageHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn search_url(&self, term: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/s");
        url.query_pairs_mut()
            .clear()
            .append_pair("k", term)
            .append_pair("page", &page.to_string());
        url
    }

    /// Scrapes pages `1..=pages` in order. Pages that cannot be fetched are
    /// skipped without the inter-page pause, so the result may be partial
    /// or empty.
    pub fn run(&self, term: &str, pages: u32) -> Vec<SponsoredRecord> {
        let mut all = Vec::new();

        for page in 1..=pages {
            info!(page, "scraping page");
            let url = self.search_url(term, page);

            let markup = match self.fetcher.fetch(&url) {
                Ok(markup) => markup,
                Err(e) => {
                    warn!(page, "skipping page: {e}");
                    continue;
                }
            };

            if let Some(hook) = &self.hook {
                hook.page_fetched(page, &url, &markup);
            }
            let records = self.parser.parse_sponsored(&markup);
            info!(page, found = records.len(), "sponsored listings on page");
            all.extend(records);

            if page < pages {
                self.pacer.pause(self.page_delay);
            }
        }

        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::pacing::NoPause;

    struct Unreachable;

    impl Fetch for Unreachable {
        fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts: 3,
            })
        }
    }

    #[test]
    fn search_url_encodes_term_and_page() {
        let scraper = Scraper::new(&ScrapeConfig::default(), Unreachable, NoPause).unwrap();
        let url = scraper.search_url("soft toys & more", 2);
        assert_eq!(url.as_str(), "https://www.amazon.in/s?k=soft+toys+%26+more&page=2");
    }

    #[test]
    fn failing_fetcher_yields_empty_run() {
        let scraper = Scraper::new(&ScrapeConfig::default(), Unreachable, NoPause).unwrap();
        assert!(scraper.run("soft toys", 3).is_empty());
    }

    #[test]
    fn zero_pages_does_nothing() {
        let scraper = Scraper::new(&ScrapeConfig::default(), Unreachable, NoPause).unwrap();
        assert!(scraper.run("soft toys", 0).is_empty());
    }
}
