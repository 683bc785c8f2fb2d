//! Error types for the Instagram client.

use thiserror::Error;

/// Result type for Instagram client operations.
pub type Result<T> = std::result::Result<T, InstagramError>;

/// Instagram client errors.
#[derive(Debug, Error)]
pub enum InstagramError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from Instagram
    #[error("Instagram API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// URL does not point at a post, reel or IGTV video
    #[error("Could not extract shortcode from Instagram URL: {0}")]
    UnrecognizedUrl(String),

    /// Credentials rejected
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Account has two-factor authentication enabled
    #[error("Login requires two-factor authentication")]
    TwoFactorRequired,

    /// HTTP 429
    #[error("Instagram is rate limiting requests (429)")]
    RateLimited,

    /// Lookup succeeded but returned no media
    #[error("Post not found or not accessible: {0}")]
    NotFound(String),

    /// Unexpected response shape
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl InstagramError {
    /// Whether the underlying transport timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
