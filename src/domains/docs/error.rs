//! Error types for documentation retrieval.
//!
//! Neither error type crosses the tool boundary: the pipeline converts both
//! into sentinel [`DocResult`](super::DocResult)s.

use thiserror::Error;

/// Errors raised while fetching a single documentation page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The locator could not be turned into an absolute URL.
    #[error("invalid document locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// The upstream did not answer within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The upstream answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Connection, TLS or body read failure.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    pub fn invalid_locator(locator: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify a reqwest failure for the given URL.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised while calling the external search endpoint.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or timed out.
    #[error("search request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-2xx status.
    #[error("search endpoint returned HTTP {0}")]
    Status(u16),

    /// The body was not a list of hits.
    #[error("malformed search response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_timeout() {
            Self::Request("request timed out".to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
