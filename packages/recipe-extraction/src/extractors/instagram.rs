//! Photo/caption platform extractor.
//!
//! Tries the public page's meta description first, then falls back to the
//! platform's web API through [`InstagramClient`], logged in when credentials
//! are configured and anonymous otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use instagram_client::{parse_shortcode, InstagramClient, InstagramError, Session};
use tracing::{debug, info, warn};

use super::html::{meta_description, title_preview};
use crate::error::{ExtractError, ExtractResult};
use crate::security::InstagramCredentials;
use crate::session::SessionCache;
use crate::traits::extractor::{ExtractedText, Extractor, PageFetcher};

/// Process-wide login state: `None` means anonymous (not configured or login failed).
pub type InstagramSessionCache = SessionCache<Option<Session>>;

pub struct InstagramExtractor {
    fetcher: Arc<dyn PageFetcher>,
    client: InstagramClient,
    credentials: Option<InstagramCredentials>,
    sessions: Arc<InstagramSessionCache>,
}

impl InstagramExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        client: InstagramClient,
        sessions: Arc<InstagramSessionCache>,
    ) -> Self {
        Self {
            fetcher,
            client,
            credentials: None,
            sessions,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<InstagramCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Primary path: description meta tags on the public page.
    async fn from_meta_tags(&self, url: &str) -> ExtractResult<ExtractedText> {
        let html = self.fetcher.fetch_html(url).await?;
        let description = meta_description(&html).ok_or_else(|| {
            ExtractError::platform("instagram", "no description meta tags on page")
        })?;

        let title = title_preview(&description);
        Ok(ExtractedText::new(description, title))
    }

    /// Fallback path: post metadata from the web API.
    async fn from_api(&self, url: &str) -> Result<ExtractedText, InstagramError> {
        let shortcode = parse_shortcode(url)?;
        let session = self.session().await;

        let post = match self.client.post(&shortcode, session.as_ref()).await {
            Ok(post) => post,
            Err(e) => {
                if session.is_some() && session_rejected(&e) {
                    warn!(error = %e, "Instagram session rejected, dropping cached login");
                    self.sessions.invalidate().await;
                }
                return Err(e);
            }
        };

        // Owner, date and counts alone say nothing about a recipe
        if !post.has_text() {
            return Err(InstagramError::NotFound(format!(
                "{} has no text content",
                shortcode
            )));
        }

        Ok(ExtractedText::new(post.to_text(), post.display_title()))
    }

    async fn session(&self) -> Option<Session> {
        let credentials = self.credentials.as_ref()?;

        self.sessions
            .get_or_refresh(move || async move {
                match self
                    .client
                    .login(&credentials.username, credentials.password.expose())
                    .await
                {
                    Ok(session) => Some(session),
                    Err(e) => {
                        warn!(error = %e, "Instagram login failed, continuing anonymously");
                        None
                    }
                }
            })
            .await
    }
}

fn session_rejected(error: &InstagramError) -> bool {
    matches!(
        error,
        InstagramError::Api { status: 401 | 403, .. } | InstagramError::LoginFailed(_)
    )
}

#[async_trait]
impl Extractor for InstagramExtractor {
    fn name(&self) -> &str {
        "instagram"
    }

    async fn extract(&self, url: &str) -> ExtractResult<ExtractedText> {
        let primary_error = match self.from_meta_tags(url).await {
            Ok(extracted) => {
                debug!(url = %url, "Instagram caption read from meta tags");
                return Ok(extracted);
            }
            Err(e) => {
                info!(url = %url, error = %e, "Instagram meta tags unavailable, trying API");
                e
            }
        };

        match self.from_api(url).await {
            Ok(extracted) => Ok(extracted),
            Err(InstagramError::UnrecognizedUrl(u)) => Err(ExtractError::invalid_url(
                u,
                "Could not extract shortcode from Instagram URL",
            )),
            Err(e) if e.is_timeout() => Err(ExtractError::Timeout {
                url: url.to_string(),
            }),
            Err(e) => Err(ExtractError::platform(
                "instagram",
                format!(
                    "Instagram metadata failed: {} (page fetch: {})",
                    e, primary_error
                ),
            )),
        }
    }
}
