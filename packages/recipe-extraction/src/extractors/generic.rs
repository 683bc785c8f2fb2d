//! Generic web page extractor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::html::{document_title, visible_text};
use crate::error::{ExtractError, ExtractResult};
use crate::traits::extractor::{ExtractedText, Extractor, PageFetcher};

/// Fetches a page and returns its visible text and `<title>`.
pub struct GenericExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl GenericExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Extractor for GenericExtractor {
    fn name(&self) -> &str {
        "generic"
    }

    async fn extract(&self, url: &str) -> ExtractResult<ExtractedText> {
        let html = self.fetcher.fetch_html(url).await?;
        let text = visible_text(&html);
        let title = document_title(&html);

        if text.is_empty() {
            return Err(ExtractError::platform(
                "web",
                format!("No visible text found at {}", url),
            ));
        }

        debug!(url = %url, chars = text.len(), title = %title, "Extracted page text");
        Ok(ExtractedText::new(text, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageFetcher;

    #[tokio::test]
    async fn test_visible_text_and_title() {
        let pages = MockPageFetcher::new().with_page(
            "https://example.com/lasagna",
            "<html><head><title>Lasagna</title></head><body><p>12 noodles</p></body></html>",
        );

        let extracted = GenericExtractor::new(Arc::new(pages))
            .extract("https://example.com/lasagna")
            .await
            .unwrap();

        assert!(extracted.text.ends_with("12 noodles"));
        assert_eq!(extracted.title, "Lasagna");
    }

    #[tokio::test]
    async fn test_blank_page_is_an_error() {
        let pages = MockPageFetcher::new().with_page("https://example.com/blank", "<html></html>");

        let err = GenericExtractor::new(Arc::new(pages))
            .extract("https://example.com/blank")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No visible text found"));
    }
}
