use ::scraper::error::SelectorErrorKind;
use std::num::ParseIntError;

/// All errors that can occur while fetching or extracting HLTV data.
#[derive(thiserror::Error, Debug)]
pub enum HltvError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A request URL could not be built.
    #[error("invalid url {url}: {reason}")]
    Url { url: String, reason: String },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Failed to parse an integer from scraped text.
    #[error("failed to parse integer: {0}")]
    IntParse(#[from] ParseIntError),

    /// An expected HTML element or attribute was not found.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },

    /// A configuration value was missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HltvError {
    /// Whether this error came from the network layer rather than from
    /// extraction or configuration.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            HltvError::Http { .. }
                | HltvError::UnexpectedStatus { .. }
                | HltvError::ResponseBody { .. }
                | HltvError::Url { .. }
        )
    }
}

impl<'a> From<SelectorErrorKind<'a>> for HltvError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        HltvError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HltvError>;
