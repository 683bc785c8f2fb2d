//! Typed errors for the recipe extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). None of these cross the
//! public `extract_and_process` boundary: the router and the controller turn
//! every error into a field on a typed result.

use std::error::Error as StdError;
use std::io::ErrorKind;

use thiserror::Error;

use crate::retry::Retriable;

/// Errors raised by the per-source extractors and the fetcher.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Disallowed scheme, missing or half-set credentials. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// URL could not be parsed or does not identify a piece of content
    #[error("{reason}: {url}")]
    InvalidUrl { url: String, reason: String },

    /// An optional external tool is not installed
    #[error("{tool} is not installed. {hint}")]
    MissingCapability { tool: String, hint: String },

    /// Request exceeded its timeout
    #[error("request timed out while fetching {url}")]
    Timeout { url: String },

    /// Could not establish a connection
    #[error("connection failed while fetching {url}: {message}")]
    Connect { url: String, message: String },

    /// Non-2xx response after redirects
    #[error("HTTP {status} error while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Any other transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Source-specific failure with the original message preserved
    #[error("{message}")]
    Platform { platform: String, message: String },
}

impl ExtractError {
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn platform(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            platform: platform.into(),
            message: message.into(),
        }
    }

    /// Classify a reqwest failure for `url`.
    ///
    /// A connection the server drops mid-request (reset, aborted, or closed
    /// before the response completed) counts as a connection failure.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() || dropped_connection(&error) {
            Self::Connect {
                url: url.to_string(),
                message: error_chain(&error),
            }
        } else if let Some(status) = error.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else if error.is_builder() {
            Self::invalid_url(url, error.to_string())
        } else {
            Self::Network(error_chain(&error))
        }
    }
}

fn sources<'a>(error: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |&e| e.source())
}

fn dropped_connection(error: &(dyn StdError + 'static)) -> bool {
    sources(error).any(|cause| {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            );
        }
        cause
            .downcast_ref::<hyper::Error>()
            .is_some_and(hyper::Error::is_incomplete_message)
    })
}

/// `outer: inner: root`, skipping causes already contained in their parent's text.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut chain = String::new();
    for cause in sources(error) {
        let text = cause.to_string();
        if !chain.contains(&text) {
            if !chain.is_empty() {
                chain.push_str(": ");
            }
            chain.push_str(&text);
        }
    }
    chain
}

impl Retriable for ExtractError {
    fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect { .. })
    }
}

/// Errors from the structured-output model behind the judge and generator.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Transport failure reaching the model
    #[error("model request failed: {0}")]
    Request(String),

    /// Model endpoint returned an error response
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response did not match the requested schema
    #[error("model response did not match schema: {0}")]
    Schema(String),

    /// Model returned no choices
    #[error("model returned an empty response")]
    Empty,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is not set
    #[error("{0} must be set")]
    Missing(&'static str),

    /// Variable is set but unusable
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    /// Only one half of a username/password pair is set
    #[error("{present} is set but {missing} is not; set both or neither")]
    IncompleteCredentials {
        present: &'static str,
        missing: &'static str,
    },
}

/// Result type alias for extractor operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for judge and generator operations.
pub type JudgeResult<T> = std::result::Result<T, JudgeError>;
