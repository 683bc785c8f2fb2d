//! Content extraction capabilities.
//!
//! An [`Extractor`] handles one source family and fails loudly with a typed
//! error. A [`ContentSource`] is the routing layer above them: it never fails,
//! it folds every error into an [`ExtractionOutcome`].

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::result::ExtractionOutcome;

/// Text pulled from a single URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub title: String,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
        }
    }
}

/// Per-source extractor: `(url) -> (text, title)`.
///
/// Implementations must return an error rather than empty text on failure.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name for logs ("generic", "instagram", ...).
    fn name(&self) -> &str;

    async fn extract(&self, url: &str) -> ExtractResult<ExtractedText>;
}

/// Raw page markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String>;
}

/// Fetch stage of the pipeline. Never fails; errors become data.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> ExtractionOutcome;
}
