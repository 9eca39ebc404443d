//! Compiled extraction strategies for search-result cards.
//!
//! Every field is read through a [`FieldChain`]: an ordered list of probes
//! tried until one produces text. Sponsorship is a list of independent
//! [`SponsorSignal`]s, any of which is enough.

use scraper::{ElementRef, Selector};

use crate::config::SelectorConfig;
use crate::error::ConfigError;

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One way of reading a value out of a card.
#[derive(Debug)]
pub enum Probe {
    /// Text of the first element matching the selector.
    Text(Selector),
    /// Attribute of the first element matching the selector.
    Attr(Selector, String),
}

impl Probe {
    pub fn read(&self, block: ElementRef<'_>) -> Option<String> {
        let value = match self {
            Probe::Text(selector) => block.select(selector).next().map(element_text)?,
            Probe::Attr(selector, name) => block
                .select(selector)
                .next()
                .and_then(|el| el.value().attr(name))
                .map(|v| v.trim().to_string())?,
        };
        (!value.is_empty()).then_some(value)
    }
}

#[derive(Debug, Default)]
pub struct FieldChain {
    probes: Vec<Probe>,
}

impl FieldChain {
    pub fn text(selectors: &[String]) -> Result<Self, ConfigError> {
        let probes = selectors
            .iter()
            .map(|s| compile(s).map(Probe::Text))
            .collect::<Result<_, _>>()?;
        Ok(Self { probes })
    }

    pub fn attr(selectors: &[String], name: &str) -> Result<Self, ConfigError> {
        let probes = selectors
            .iter()
            .map(|s| compile(s).map(|sel| Probe::Attr(sel, name.to_string())))
            .collect::<Result<_, _>>()?;
        Ok(Self { probes })
    }

    /// First non-empty value in probe order.
    pub fn resolve(&self, block: ElementRef<'_>) -> Option<String> {
        self.probes.iter().find_map(|probe| probe.read(block))
    }
}

/// One piece of evidence that a card is an advertisement.
#[derive(Debug)]
pub enum SponsorSignal {
    /// A label element whose trimmed text equals the expected text.
    LabelText { selector: Selector, text: String },
    /// Any attribute of the card itself containing the (lowercase) needle.
    AttributeContains(String),
    /// A dedicated sponsored-label element anywhere in the card.
    LabelPresent(Selector),
}

impl SponsorSignal {
    pub fn fires(&self, block: ElementRef<'_>) -> bool {
        match self {
            SponsorSignal::LabelText { selector, text } => block
                .select(selector)
                .any(|label| element_text(label) == *text),
            SponsorSignal::AttributeContains(needle) => block
                .value()
                .attrs()
                .any(|(_, value)| value.to_lowercase().contains(needle.as_str())),
            SponsorSignal::LabelPresent(selector) => block.select(selector).next().is_some(),
        }
    }
}

#[derive(Debug)]
pub struct ListingSelectors {
    pub block: Selector,
    pub signals: Vec<SponsorSignal>,
    pub title: FieldChain,
    pub product_link: FieldChain,
    pub brand: FieldChain,
    pub rating: FieldChain,
    pub reviews: FieldChain,
    pub price_whole: FieldChain,
    pub image: FieldChain,
}

impl ListingSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        // Blank entries disable a signal; an empty needle would match everything.
        let mut signals = Vec::new();
        if !config.sponsored_label.trim().is_empty() {
            signals.push(SponsorSignal::LabelText {
                selector: compile(&config.sponsored_label)?,
                text: config.sponsored_label_text.trim().to_string(),
            });
        }
        if !config.sponsored_attr_needle.trim().is_empty() {
            signals.push(SponsorSignal::AttributeContains(
                config.sponsored_attr_needle.trim().to_lowercase(),
            ));
        }
        if !config.sponsored_badge.trim().is_empty() {
            signals.push(SponsorSignal::LabelPresent(compile(&config.sponsored_badge)?));
        }

        Ok(Self {
            block: compile(&config.result_block)?,
            signals,
            title: FieldChain::text(&config.title)?,
            product_link: FieldChain::attr(&config.product_link, "href")?,
            brand: FieldChain::text(&config.brand)?,
            rating: FieldChain::text(&config.rating)?,
            reviews: FieldChain::text(&config.reviews)?,
            price_whole: FieldChain::text(&config.price_whole)?,
            image: FieldChain::attr(&config.image, "src")?,
        })
    }

    pub fn is_sponsored(&self, block: ElementRef<'_>) -> bool {
        self.signals.iter().any(|signal| signal.fires(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_block(html: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("div.card").unwrap();
        html.select(&sel).next().unwrap()
    }

    #[test]
    fn default_config_compiles() {
        let selectors = ListingSelectors::compile(&SelectorConfig::default()).unwrap();
        assert_eq!(selectors.signals.len(), 3);
    }

    #[test]
    fn broken_selector_is_reported() {
        let config = SelectorConfig {
            title: vec!["h2 >>> span[".into()],
            ..SelectorConfig::default()
        };
        let err = ListingSelectors::compile(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Selector { ref selector, .. } if selector == "h2 >>> span["
        ));
    }

    #[test]
    fn blank_needle_disables_attribute_signal() {
        let config = SelectorConfig {
            sponsored_attr_needle: "  ".into(),
            ..SelectorConfig::default()
        };
        let selectors = ListingSelectors::compile(&config).unwrap();
        assert_eq!(selectors.signals.len(), 2);

        let html = Html::parse_document(r#"<div class="card" data-x="anything"></div>"#);
        assert!(!selectors.is_sponsored(first_block(&html)));
    }

    #[test]
    fn chain_falls_through_to_later_probe() {
        let chain = FieldChain::text(&["span.missing".into(), "h5 span".into()]).unwrap();
        let html = Html::parse_document(
            r#"<div class="card"><h5><span>  Plush   World </span></h5></div>"#,
        );
        assert_eq!(chain.resolve(first_block(&html)).as_deref(), Some("Plush World"));
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let chain = FieldChain::text(&["span.brand".into(), "h5 span".into()]).unwrap();
        let html = Html::parse_document(
            r#"<div class="card"><span class="brand">  </span>
               <h5><span>Fallback</span></h5></div>"#,
        );
        assert_eq!(chain.resolve(first_block(&html)).as_deref(), Some("Fallback"));
    }

    #[test]
    fn attribute_probe_reads_named_attribute() {
        let chain = FieldChain::attr(&["img.s-image".into()], "src").unwrap();
        let html = Html::parse_document(
            r#"<div class="card"><img class="s-image" src="https://m.media/x.jpg"></div>"#,
        );
        assert_eq!(
            chain.resolve(first_block(&html)).as_deref(),
            Some("https://m.media/x.jpg")
        );
    }

    #[test]
    fn label_text_must_match_exactly() {
        let signal = SponsorSignal::LabelText {
            selector: Selector::parse("span.label").unwrap(),
            text: "Sponsored".into(),
        };
        let exact = Html::parse_document(
            r#"<div class="card"><span class="label"> Sponsored </span></div>"#,
        );
        let other = Html::parse_document(
            r#"<div class="card"><span class="label">Sponsored by us</span></div>"#,
        );
        assert!(signal.fires(first_block(&exact)));
        assert!(!signal.fires(first_block(&other)));
    }

    #[test]
    fn attribute_signal_is_case_insensitive() {
        let signal = SponsorSignal::AttributeContains("sponsor".into());
        let html =
            Html::parse_document(r#"<div class="card AdHolder" data-ad="SPONSORED_RESULT"></div>"#);
        assert!(signal.fires(first_block(&html)));
    }
}
