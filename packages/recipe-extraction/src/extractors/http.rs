//! HTTPS page fetcher with retry on transient failures.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ExtractError, ExtractResult};
use crate::retry::with_retry;
use crate::traits::extractor::PageFetcher;
use crate::types::config::FetchConfig;

/// Plain GET against a page with a browser identity, following redirects.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = HttpFetcher::new(FetchConfig::default())?;
/// let html = fetcher.fetch_html("https://example.com/recipes/lasagna").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> ExtractResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| ExtractError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch raw markup. Non-HTTPS URLs fail immediately without a request.
    pub async fn fetch_html(&self, url: &str) -> ExtractResult<String> {
        require_https(url)?;
        with_retry(&self.config.retry, "fetch_html", || self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &str) -> ExtractResult<String> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            ExtractError::from_reqwest(url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ExtractError::from_reqwest(url, e))?;

        debug!(url = %url, bytes = html.len(), "HTTP fetch complete");
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String> {
        HttpFetcher::fetch_html(self, url).await
    }
}

/// Parse `url` and reject anything that is not `https`.
pub fn require_https(url: &str) -> ExtractResult<Url> {
    let parsed = Url::parse(url).map_err(|e| ExtractError::invalid_url(url, e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(ExtractError::Config(
            "URL must start with 'https://'".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{retry_with_sleep, RetryPolicy};
    use crate::testing::{http_response, StubServer};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Fetcher that ignores proxy settings so loopback stubs are reachable.
    fn loopback_fetcher() -> HttpFetcher {
        HttpFetcher {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            config: FetchConfig::default(),
        }
    }

    async fn fetch_with_backoff(
        fetcher: &HttpFetcher,
        url: &str,
    ) -> (ExtractResult<String>, Vec<Duration>) {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let log = sleeps.clone();
        let result = retry_with_sleep(
            &RetryPolicy::new(3, 1.0),
            "fetch_html",
            || fetcher.fetch_once(url),
            move |d| {
                log.lock().unwrap().push(d);
                std::future::ready(())
            },
        )
        .await;
        let sleeps = sleeps.lock().unwrap().clone();
        (result, sleeps)
    }

    #[test]
    fn test_require_https() {
        assert!(require_https("https://example.com/recipe").is_ok());

        let err = require_https("http://example.com/recipe").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
        assert!(err.to_string().contains("URL must start with 'https://'"));

        let err = require_https("not a url").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_plain_http_is_rejected_before_any_request() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let err = fetcher.fetch_html("http://127.0.0.1:9/never").await.unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[tokio::test]
    async fn test_page_body_is_returned() {
        let server = StubServer::start(|_| {
            Some(http_response(200, &[("Content-Type", "text/html")], "<h1>Lasagna</h1>"))
        })
        .await;

        let (result, sleeps) = fetch_with_backoff(&loopback_fetcher(), &server.url("/r")).await;
        assert_eq!(result.unwrap(), "<h1>Lasagna</h1>");
        assert!(sleeps.is_empty());
    }

    #[tokio::test]
    async fn test_missing_page_is_not_retried() {
        let server = StubServer::start(|_| Some(http_response(404, &[], "gone"))).await;
        let url = server.url("/recipes/lasagna");

        let (result, sleeps) = fetch_with_backoff(&loopback_fetcher(), &url).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ExtractError::HttpStatus { status: 404, .. }));
        assert_eq!(err.to_string(), format!("HTTP 404 error while fetching {}", url));
        assert_eq!(server.hits(), 1);
        assert!(sleeps.is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection_is_retried() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/recipe", port);

        let (result, sleeps) = fetch_with_backoff(&loopback_fetcher(), &url).await;

        assert!(matches!(result, Err(ExtractError::Connect { .. })));
        assert_eq!(sleeps, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_hang_up_before_response_is_retried() {
        let server = StubServer::start(|_| None).await;

        let (result, sleeps) = fetch_with_backoff(&loopback_fetcher(), &server.url("/r")).await;

        assert!(matches!(result, Err(ExtractError::Connect { .. })));
        assert_eq!(server.hits(), 3);
        assert_eq!(sleeps.len(), 2);
    }
}
