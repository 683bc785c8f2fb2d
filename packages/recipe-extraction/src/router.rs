//! URL classification and dispatch to the per-source extractors.
//!
//! The router is the error boundary of the fetch stage: every extractor
//! failure is turned into an [`ExtractionOutcome`] with a readable message.

use std::sync::Arc;

use async_trait::async_trait;
use instagram_client::InstagramClient;
use tracing::{debug, warn};
use url::Url;

use crate::config::RecipeConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::extractors::{
    GenericExtractor, HttpFetcher, InstagramExtractor, InstagramSessionCache, VideoExtractor, YtDlp,
};
use crate::traits::extractor::{ContentSource, Extractor, PageFetcher};
use crate::traits::video::VideoMetadataTool;
use crate::types::result::ExtractionOutcome;

const INSTAGRAM_HINT: &str = " (Instagram may be rate limiting or blocking access. Content may be private, restricted, or require authentication)";
const TIKTOK_HINT: &str =
    " (TikTok is blocking this request. Content may be geo-restricted or blocked from your IP)";

/// Source families, one extractor each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFamily {
    Instagram,
    YouTube,
    TikTok,
    Generic,
}

type HostPredicate = fn(&str) -> bool;

/// Checked in order; the first match wins. Unmatched hosts are generic.
const FAMILY_RULES: &[(SourceFamily, HostPredicate)] = &[
    (SourceFamily::Instagram, is_instagram_host),
    (SourceFamily::YouTube, is_youtube_host),
    (SourceFamily::TikTok, is_tiktok_host),
];

fn is_instagram_host(host: &str) -> bool {
    host_is(host, "instagram.com") || host_is(host, "instagr.am")
}

fn is_youtube_host(host: &str) -> bool {
    host_is(host, "youtube.com") || host_is(host, "youtu.be")
}

fn is_tiktok_host(host: &str) -> bool {
    host_is(host, "tiktok.com")
}

fn host_is(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Pick the source family for `url` from its host alone.
pub fn classify(url: &str) -> SourceFamily {
    let host = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

    let Some(host) = host else {
        return SourceFamily::Generic;
    };

    FAMILY_RULES
        .iter()
        .find(|(_, matches)| matches(&host))
        .map(|(family, _)| *family)
        .unwrap_or(SourceFamily::Generic)
}

pub struct ExtractionRouter {
    routes: Vec<(SourceFamily, Arc<dyn Extractor>)>,
    fallback: Arc<dyn Extractor>,
}

impl ExtractionRouter {
    /// Router that sends everything to `fallback` until routes are added.
    pub fn new(fallback: Arc<dyn Extractor>) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// Register (or replace) the extractor for a family.
    pub fn with_route(mut self, family: SourceFamily, extractor: Arc<dyn Extractor>) -> Self {
        if family == SourceFamily::Generic {
            self.fallback = extractor;
            return self;
        }
        self.routes.retain(|(f, _)| *f != family);
        self.routes.push((family, extractor));
        self
    }

    /// Production wiring: HTTPS fetcher, Instagram client with a session cache, and yt-dlp.
    pub fn from_config(config: &RecipeConfig) -> ExtractResult<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(config.fetch.clone())?);
        let sessions = Arc::new(InstagramSessionCache::new(config.instagram_session_ttl));
        let tool: Arc<dyn VideoMetadataTool> = Arc::new(
            YtDlp::new()
                .with_binary(config.yt_dlp_path.clone())
                .with_timeout(config.fetch.timeout * 6),
        );

        let instagram = InstagramExtractor::new(
            fetcher.clone(),
            InstagramClient::with_timeout(config.fetch.timeout),
            sessions,
        )
        .with_credentials(config.instagram.clone());

        Ok(Self::new(Arc::new(GenericExtractor::new(fetcher)))
            .with_route(SourceFamily::Instagram, Arc::new(instagram))
            .with_route(SourceFamily::YouTube, Arc::new(VideoExtractor::youtube(tool.clone())))
            .with_route(SourceFamily::TikTok, Arc::new(VideoExtractor::tiktok(tool))))
    }

    pub fn extractor_for(&self, family: SourceFamily) -> &Arc<dyn Extractor> {
        self.routes
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, extractor)| extractor)
            .unwrap_or(&self.fallback)
    }

    /// Extract `url` with the matching extractor. Never fails.
    pub async fn route(&self, url: &str) -> ExtractionOutcome {
        let family = classify(url);
        let extractor = self.extractor_for(family);
        debug!(url = %url, ?family, extractor = extractor.name(), "Routing URL");

        match extractor.extract(url).await {
            Ok(extracted) => ExtractionOutcome::ok(extracted.text, extracted.title),
            Err(e) => {
                let message = describe_failure(url, family, &e);
                warn!(url = %url, ?family, error = %message, "Extraction failed");
                ExtractionOutcome::failed(message)
            }
        }
    }
}

#[async_trait]
impl ContentSource for ExtractionRouter {
    async fn fetch(&self, url: &str) -> ExtractionOutcome {
        self.route(url).await
    }
}

/// Caller-facing message for an extractor failure.
pub fn describe_failure(url: &str, family: SourceFamily, error: &ExtractError) -> String {
    match error {
        ExtractError::MissingCapability { .. } => format!("Missing dependency: {}", error),
        ExtractError::InvalidUrl { .. } => format!("Invalid URL format: {}", error),
        ExtractError::Config(_) => error.to_string(),
        ExtractError::Timeout { .. } => format!("Request timed out while fetching {}", url),
        ExtractError::HttpStatus { status, .. } => {
            format!("HTTP {} error while fetching {}", status, url)
        }
        ExtractError::Connect { message, .. } => format!("Network error: {}", message),
        ExtractError::Network(message) => format!("Network error: {}", message),
        ExtractError::Platform { message, .. } => {
            format!("Failed to extract content: {}{}", message, remediation_hint(family, message))
        }
    }
}

fn remediation_hint(family: SourceFamily, message: &str) -> &'static str {
    match family {
        SourceFamily::Instagram
            if ["403", "401", "Forbidden", "metadata failed"]
                .iter()
                .any(|needle| message.contains(needle)) =>
        {
            INSTAGRAM_HINT
        }
        SourceFamily::TikTok => {
            let lower = message.to_lowercase();
            if lower.contains("blocked") || lower.contains("ip address") {
                TIKTOK_HINT
            } else {
                ""
            }
        }
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExtractor;

    #[test]
    fn test_classify_hosts() {
        let cases = [
            ("https://www.instagram.com/reel/DCR9-Y8Sdga/", SourceFamily::Instagram),
            ("https://instagram.com/p/ABC123", SourceFamily::Instagram),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", SourceFamily::YouTube),
            ("https://youtube.com/shorts/abc", SourceFamily::YouTube),
            ("https://youtu.be/dQw4w9WgXcQ", SourceFamily::YouTube),
            ("https://m.youtube.com/watch?v=x", SourceFamily::YouTube),
            ("https://www.tiktok.com/@chef/video/123", SourceFamily::TikTok),
            ("https://vm.tiktok.com/ZMabc/", SourceFamily::TikTok),
            ("https://example.com/recipes/lasagna", SourceFamily::Generic),
            ("https://notinstagram.com/p/x", SourceFamily::Generic),
            ("https://example.com/?ref=instagram.com", SourceFamily::Generic),
            ("not a url", SourceFamily::Generic),
        ];

        for (url, expected) in cases {
            assert_eq!(classify(url), expected, "{url}");
        }
    }

    #[test]
    fn test_failure_messages() {
        let url = "https://example.com/x";

        let msg = describe_failure(
            url,
            SourceFamily::Generic,
            &ExtractError::HttpStatus {
                status: 404,
                url: url.into(),
            },
        );
        assert_eq!(msg, "HTTP 404 error while fetching https://example.com/x");

        let msg = describe_failure(url, SourceFamily::Generic, &ExtractError::Timeout { url: url.into() });
        assert_eq!(msg, "Request timed out while fetching https://example.com/x");

        let msg = describe_failure(
            url,
            SourceFamily::YouTube,
            &ExtractError::MissingCapability {
                tool: "yt-dlp".into(),
                hint: "Install it with: pip install yt-dlp".into(),
            },
        );
        assert!(msg.starts_with("Missing dependency: yt-dlp is not installed"));

        let msg = describe_failure(
            url,
            SourceFamily::Generic,
            &ExtractError::Config("URL must start with 'https://'".into()),
        );
        assert!(msg.contains("URL must start with 'https://'"));
    }

    #[test]
    fn test_platform_hints() {
        let err = ExtractError::platform("instagram", "Instagram metadata failed: 403 Forbidden");
        let msg = describe_failure("https://instagram.com/p/x", SourceFamily::Instagram, &err);
        assert!(msg.starts_with("Failed to extract content: "));
        assert!(msg.ends_with(INSTAGRAM_HINT));

        let err = ExtractError::platform("TikTok", "Your IP address is blocked from accessing this post");
        let msg = describe_failure("https://tiktok.com/@a/video/1", SourceFamily::TikTok, &err);
        assert!(msg.ends_with(TIKTOK_HINT));

        let err = ExtractError::platform("TikTok", "Unsupported URL");
        let msg = describe_failure("https://tiktok.com/@a/video/1", SourceFamily::TikTok, &err);
        assert_eq!(msg, "Failed to extract content: Unsupported URL");

        // hints only apply to their own platform
        let err = ExtractError::platform("web", "403 Forbidden");
        let msg = describe_failure("https://example.com", SourceFamily::Generic, &err);
        assert!(!msg.contains("Instagram"));
    }

    #[tokio::test]
    async fn test_route_dispatches_by_family() {
        let generic = Arc::new(MockExtractor::new("generic").with_text("page text", "Page"));
        let youtube = Arc::new(MockExtractor::new("youtube").with_text("video text", "Video"));

        let router = ExtractionRouter::new(generic.clone())
            .with_route(SourceFamily::YouTube, youtube.clone());

        let outcome = router.route("https://youtu.be/abc").await;
        assert!(outcome.success);
        assert_eq!(outcome.content, "video text");

        // no Instagram route registered: falls through to generic
        let outcome = router.route("https://www.instagram.com/p/abc/").await;
        assert_eq!(outcome.title, "Page");

        assert_eq!(youtube.calls(), vec!["https://youtu.be/abc".to_string()]);
        assert_eq!(generic.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_route_never_fails() {
        let failing = Arc::new(MockExtractor::new("generic").with_error(|url| {
            ExtractError::HttpStatus {
                status: 500,
                url: url.to_string(),
            }
        }));
        let router = ExtractionRouter::new(failing);

        let outcome = router.fetch("https://example.com/broken").await;
        assert!(!outcome.success);
        assert!(outcome.content.is_empty());
        assert_eq!(
            outcome.error.as_deref(),
            Some("HTTP 500 error while fetching https://example.com/broken")
        );
    }
}
