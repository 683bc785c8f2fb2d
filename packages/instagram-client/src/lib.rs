//! Pure Instagram web API client.
//!
//! A minimal client for the endpoints the instagram.com web app uses. Supports
//! resolving a post URL to its shortcode, logging in to obtain a cookie-backed
//! session, and looking up a post's caption and engagement metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use instagram_client::{parse_shortcode, InstagramClient};
//!
//! let client = InstagramClient::new();
//! let shortcode = parse_shortcode("https://www.instagram.com/reel/DCR9-Y8Sdga/")?;
//!
//! // Anonymous lookups work for public posts until Instagram starts throttling
//! let post = client.post(&shortcode, None).await?;
//! println!("{}", post.to_text());
//!
//! // Logged-in lookups reuse the session's cookie jar
//! let session = client.login("user", "pass").await?;
//! let post = client.post(&shortcode, Some(&session)).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{InstagramError, Result};
pub use types::{LoginResponse, Post};

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode};
use types::{GraphQlResponse, ShortcodeMediaData};

const BASE_URL: &str = "https://www.instagram.com";

/// Public app id sent by the instagram.com web client.
const WEB_APP_ID: &str = "936619743392459";

/// Persisted GraphQL document for the shortcode media lookup.
const SHORTCODE_MEDIA_DOC_ID: &str = "8845758582119845";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static SHORTCODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"instagram\.com/(?:[A-Za-z0-9_.]+/)?(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)")
        .expect("shortcode pattern is valid")
});

/// Extract the post shortcode from an Instagram URL.
///
/// Recognizes `/p/`, `/reel/`, `/reels/` and `/tv/` links, with or without a
/// leading username segment. Profile and explore URLs are rejected.
pub fn parse_shortcode(url: &str) -> Result<String> {
    SHORTCODE_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| InstagramError::UnrecognizedUrl(url.to_string()))
}

/// A logged-in session. Cloning shares the underlying cookie jar.
#[derive(Clone)]
pub struct Session {
    client: Client,
    jar: Arc<Jar>,
    username: String,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("established_at", &self.established_at)
            .finish()
    }
}

pub struct InstagramClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    timeout: Duration,
}

impl Default for InstagramClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InstagramClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(15))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let jar = Arc::new(Jar::default());
        Self {
            client: build_client(jar.clone(), timeout),
            jar,
            base_url: BASE_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at a different host (proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Log in with username and password, returning a reusable session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        tracing::info!(username, "Logging in to Instagram");

        let jar = Arc::new(Jar::default());
        let client = build_client(jar.clone(), self.timeout);

        // The login page sets the csrftoken cookie the ajax endpoint expects
        let login_page = format!("{}/accounts/login/", self.base_url);
        let resp = client.get(&login_page).send().await?;
        ensure_success(resp.status(), || "login page".to_string())?;

        let csrf = csrf_token(&jar, &self.base_url).ok_or_else(|| {
            InstagramError::LoginFailed("no csrftoken cookie issued".to_string())
        })?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            Utc::now().timestamp(),
            password
        );
        let form = [
            ("username", username),
            ("enc_password", enc_password.as_str()),
            ("queryParams", "{}"),
            ("optIntoOneTap", "false"),
        ];

        let resp = client
            .post(format!("{}/api/v1/web/accounts/login/ajax/", self.base_url))
            .header("X-CSRFToken", csrf)
            .header("X-IG-App-ID", WEB_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", &login_page)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InstagramError::RateLimited);
        }

        let body = resp.text().await?;
        let login: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            InstagramError::Parse(format!("login response (HTTP {}): {}", status.as_u16(), e))
        })?;

        if login.two_factor_required {
            return Err(InstagramError::TwoFactorRequired);
        }
        if !login.authenticated {
            let reason = login
                .message
                .or(login.checkpoint_url.map(|u| format!("checkpoint required: {}", u)))
                .unwrap_or_else(|| {
                    if login.user {
                        "wrong password".to_string()
                    } else {
                        "user does not exist".to_string()
                    }
                });
            return Err(InstagramError::LoginFailed(reason));
        }

        tracing::info!(username, user_id = ?login.user_id, "Instagram login succeeded");

        Ok(Session {
            client,
            jar,
            username: username.to_string(),
            established_at: Utc::now(),
        })
    }

    /// Look up a post by shortcode, anonymously or with a session.
    pub async fn post(&self, shortcode: &str, session: Option<&Session>) -> Result<Post> {
        let (client, jar) = match session {
            Some(s) => (&s.client, &s.jar),
            None => (&self.client, &self.jar),
        };

        tracing::debug!(
            shortcode,
            authenticated = session.is_some(),
            "Fetching Instagram post metadata"
        );

        let variables = serde_json::json!({
            "shortcode": shortcode,
            "fetch_tagged_user_count": null,
            "hoisted_comment_id": null,
            "hoisted_reply_id": null,
        })
        .to_string();
        let form = [
            ("variables", variables.as_str()),
            ("doc_id", SHORTCODE_MEDIA_DOC_ID),
        ];

        let mut request = client
            .post(format!("{}/graphql/query", self.base_url))
            .header("X-IG-App-ID", WEB_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", format!("{}/p/{}/", self.base_url, shortcode))
            .form(&form);
        if let Some(csrf) = csrf_token(jar, &self.base_url) {
            request = request.header("X-CSRFToken", csrf);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InstagramError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        let body = resp.text().await?;
        parse_post_response(shortcode, &body)
    }
}

fn build_client(jar: Arc<Jar>, timeout: Duration) -> Client {
    Client::builder()
        .cookie_provider(jar)
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

fn ensure_success(status: StatusCode, what: impl FnOnce() -> String) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(InstagramError::RateLimited);
    }
    Err(InstagramError::Api {
        status: status.as_u16(),
        message: format!("{} returned HTTP {}", what(), status.as_u16()),
    })
}

/// Read the csrftoken cookie Instagram issued for `base_url`.
fn csrf_token(jar: &Jar, base_url: &str) -> Option<String> {
    let url = base_url.parse().ok()?;
    let header = jar.cookies(&url)?;
    cookie_value(header.to_str().ok()?, "csrftoken")
}

fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

fn parse_post_response(shortcode: &str, body: &str) -> Result<Post> {
    let response: GraphQlResponse<ShortcodeMediaData> =
        serde_json::from_str(body).map_err(|e| InstagramError::Parse(e.to_string()))?;

    if response.status.as_deref() == Some("fail") {
        return Err(InstagramError::Api {
            status: 200,
            message: response
                .message
                .unwrap_or_else(|| "query failed".to_string()),
        });
    }

    response
        .data
        .and_then(|d| d.xdt_shortcode_media)
        .map(Post::from)
        .ok_or_else(|| InstagramError::NotFound(shortcode.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
