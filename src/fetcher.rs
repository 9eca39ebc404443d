use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::redirect;
use tracing::{debug, warn};
use url::Url;

use crate::config::{RetryPolicy, ScrapeConfig};
use crate::error::{AttemptFailure, FetchError};
use crate::pacing::Pacer;

const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
);
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Something that turns a URL into page markup.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

/// Runs `attempt` until it succeeds or the policy is used up, pausing
/// between attempts (never after the last one).
pub fn fetch_with_retries<P, F>(
    url: &Url,
    policy: &RetryPolicy,
    pacer: &P,
    mut attempt: F,
) -> Result<String, FetchError>
where
    P: Pacer + ?Sized,
    F: FnMut() -> Result<String, AttemptFailure>,
{
    let attempts = policy.max_attempts.max(1);
    for n in 1..=attempts {
        match attempt() {
            Ok(body) => return Ok(body),
            Err(e) => warn!(%url, attempt = n, of = attempts, "fetch failed: {e}"),
        }
        if n < attempts {
            pacer.pause(policy.backoff);
        }
    }
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
    })
}

fn browser_headers(referer: &Url) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_str(referer.as_str())?);
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    Ok(headers)
}

/// Blocking HTTP fetcher posing as a desktop browser.
pub struct HttpFetcher<P> {
    client: Client,
    retry: RetryPolicy,
    pacer: P,
}

impl<P: Pacer> HttpFetcher<P> {
    pub fn new(config: &ScrapeConfig, pacer: P) -> Result<Self, FetchError> {
        let max_redirects = config.max_redirects;
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("too many redirects (>{max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        // Accept-Encoding comes from reqwest's gzip/brotli/deflate support,
        // which also decodes the body.
        let client = Client::builder()
            .default_headers(browser_headers(&config.base_url)?)
            .redirect(redirect_policy)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            retry: config.retry,
            pacer,
        })
    }

    fn attempt(&self, url: &Url) -> Result<String, AttemptFailure> {
        let resp = self.client.get(url.clone()).send()?;
        if resp.status() != StatusCode::OK {
            return Err(AttemptFailure::Status(resp.status().as_u16()));
        }
        let body = resp.text()?;
        debug!(%url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}

impl<P: Pacer> Fetch for HttpFetcher<P> {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        fetch_with_retries(url, &self.retry, &self.pacer, || self.attempt(url))
    }
}
