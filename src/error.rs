use thiserror::Error;

/// A single failed request attempt. Always retried until the policy runs out.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("unexpected status code: {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("giving up on {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Failure while reading one listing block. Discards that record only.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot resolve product link {href:?}: {source}")]
    ProductUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("invalid delay window: min {min:?} exceeds max {max:?}")]
    InvalidWindow {
        min: std::time::Duration,
        max: std::time::Duration,
    },
}
