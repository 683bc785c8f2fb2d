//! Testing utilities including mock implementations.
//!
//! These drive the router and the controller with scripted pages and verdicts,
//! without making model calls or touching the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::error::{ExtractError, ExtractResult, JudgeError, JudgeResult};
use crate::traits::{
    extractor::{ContentSource, ExtractedText, Extractor, PageFetcher},
    judge::{RecipeGenerator, RecipeJudge},
    video::{VideoLookup, VideoMetadata, VideoMetadataTool},
};
use crate::types::{
    generation::{GenerationRequest, RecipeNameExtraction},
    judgment::{JudgmentRequest, JudgmentResponse},
    recipe::{Ingredient, Quantity, StructuredRecipe},
    result::ExtractionOutcome,
};

type JudgeErrorFactory = Box<dyn Fn() -> JudgeError + Send + Sync>;
type ExtractErrorFactory = Box<dyn Fn(&str) -> ExtractError + Send + Sync>;

/// A scripted judge.
///
/// Verdicts and failures are keyed by URL. Unscripted URLs get a plain
/// "not a recipe" verdict unless a default is set.
#[derive(Default)]
pub struct MockJudge {
    /// Predefined verdicts by URL
    responses: Arc<RwLock<HashMap<String, JudgmentResponse>>>,

    /// URLs whose judgment should fail
    errors: Arc<RwLock<HashMap<String, JudgeErrorFactory>>>,

    /// Verdict for URLs without a script
    default_response: Option<JudgmentResponse>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<JudgmentRequest>>>,
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` whenever `url` is judged.
    pub fn with_response(self, url: impl Into<String>, response: JudgmentResponse) -> Self {
        self.responses.write().unwrap().insert(url.into(), response);
        self
    }

    /// Fail whenever `url` is judged.
    pub fn with_error_for<F>(self, url: impl Into<String>, error: F) -> Self
    where
        F: Fn() -> JudgeError + Send + Sync + 'static,
    {
        self.errors.write().unwrap().insert(url.into(), Box::new(error));
        self
    }

    /// Verdict for URLs without a script.
    pub fn with_default(mut self, response: JudgmentResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Every request seen, in order.
    pub fn requests(&self) -> Vec<JudgmentRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl RecipeJudge for MockJudge {
    async fn judge(&self, request: &JudgmentRequest) -> JudgeResult<JudgmentResponse> {
        self.requests.write().unwrap().push(request.clone());

        if let Some(error) = self.errors.read().unwrap().get(&request.url) {
            return Err(error());
        }

        let scripted = self.responses.read().unwrap().get(&request.url).cloned();
        Ok(scripted
            .or_else(|| self.default_response.clone())
            .unwrap_or_else(|| JudgmentResponse {
                confidence: 0.9,
                ..JudgmentResponse::degraded("No recipe content found")
            }))
    }
}

/// A scripted generator for the knowledge fallback and name extraction.
#[derive(Default)]
pub struct MockGenerator {
    recipe: Option<StructuredRecipe>,
    name: Option<RecipeNameExtraction>,

    /// Applies to both operations when set
    error: Option<JudgeErrorFactory>,

    requests: Arc<RwLock<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, recipe: StructuredRecipe) -> Self {
        self.recipe = Some(recipe);
        self
    }

    pub fn with_name(mut self, name: RecipeNameExtraction) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_error<F>(mut self, error: F) -> Self
    where
        F: Fn() -> JudgeError + Send + Sync + 'static,
    {
        self.error = Some(Box::new(error));
        self
    }

    /// Every generation request seen, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl RecipeGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> JudgeResult<StructuredRecipe> {
        self.requests.write().unwrap().push(request.clone());

        if let Some(error) = &self.error {
            return Err(error());
        }
        self.recipe.clone().ok_or(JudgeError::Empty)
    }

    async fn extract_recipe_name(&self, _text: &str) -> JudgeResult<RecipeNameExtraction> {
        if let Some(error) = &self.error {
            return Err(error());
        }
        self.name.clone().ok_or(JudgeError::Empty)
    }
}

/// A content source serving predefined outcomes.
///
/// Unknown URLs fail the way a missing page would.
#[derive(Default)]
pub struct MockContentSource {
    /// Predefined outcomes by URL
    outcomes: Arc<RwLock<HashMap<String, ExtractionOutcome>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn with_page(
        self,
        url: impl Into<String>,
        content: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.outcomes
            .write()
            .unwrap()
            .insert(url.into(), ExtractionOutcome::ok(content, title));
        self
    }

    /// Fail `url` with `error`.
    pub fn with_failure(self, url: impl Into<String>, error: impl Into<String>) -> Self {
        self.outcomes
            .write()
            .unwrap()
            .insert(url.into(), ExtractionOutcome::failed(error));
        self
    }

    /// URLs fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch(&self, url: &str) -> ExtractionOutcome {
        self.calls.write().unwrap().push(url.to_string());

        self.outcomes
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                ExtractionOutcome::failed(format!("HTTP 404 error while fetching {}", url))
            })
    }
}

/// An extractor returning fixed text or a fixed error.
pub struct MockExtractor {
    name: String,
    text: Option<ExtractedText>,
    error: Option<ExtractErrorFactory>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockExtractor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            error: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>, title: impl Into<String>) -> Self {
        self.text = Some(ExtractedText::new(text, title));
        self
    }

    /// Fail every call; the closure receives the requested URL.
    pub fn with_error<F>(mut self, error: F) -> Self
    where
        F: Fn(&str) -> ExtractError + Send + Sync + 'static,
    {
        self.error = Some(Box::new(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, url: &str) -> ExtractResult<ExtractedText> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(error) = &self.error {
            return Err(error(url));
        }
        self.text
            .clone()
            .ok_or_else(|| ExtractError::platform(self.name.clone(), "No content extracted"))
    }
}

/// A page fetcher serving predefined markup.
///
/// Unknown URLs fail with HTTP 404.
#[derive(Default)]
pub struct MockPageFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// URLs fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

type Responder = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A local HTTP/1.1 server on `127.0.0.1` answering from a closure.
///
/// The closure gets the raw request (head and body) and returns a raw
/// response, or `None` to close the connection without replying. One request
/// is served per connection.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<RwLock<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(RwLock::new(Vec::new()));
        let respond: Responder = Arc::new(respond);

        let log = requests.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_one(stream, respond.clone(), log.clone()));
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Raw requests received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// Requests whose request line starts with `prefix` (e.g. `"POST /graphql"`).
    pub fn hits_to(&self, prefix: &str) -> usize {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_one(mut stream: TcpStream, respond: Responder, log: Arc<RwLock<Vec<String>>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    log.write().unwrap().push(request.clone());

    if let Some(response) = respond(&request) {
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }
}

/// Read one request, including a `Content-Length` body.
async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let body_len = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + body_len {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(String::from_utf8_lossy(&buf).to_string())
}

/// A raw `Connection: close` response.
pub fn http_response(status: u16, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// A video metadata tool that never spawns a process.
#[derive(Default)]
pub struct MockVideoTool {
    metadata: Option<VideoMetadata>,
    error: Option<Box<dyn Fn() -> ExtractError + Send + Sync>>,
    lookups: Arc<RwLock<Vec<VideoLookup>>>,
}

impl MockVideoTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: VideoMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_error<F>(mut self, error: F) -> Self
    where
        F: Fn() -> ExtractError + Send + Sync + 'static,
    {
        self.error = Some(Box::new(error));
        self
    }

    /// Lookups requested, in order.
    pub fn lookups(&self) -> Vec<VideoLookup> {
        self.lookups.read().unwrap().clone()
    }
}

#[async_trait]
impl VideoMetadataTool for MockVideoTool {
    async fn fetch_metadata(&self, url: &str, lookup: &VideoLookup) -> ExtractResult<VideoMetadata> {
        self.lookups.write().unwrap().push(lookup.clone());

        if let Some(error) = &self.error {
            return Err(error());
        }
        self.metadata
            .clone()
            .ok_or_else(|| ExtractError::platform("yt-dlp", format!("No metadata for {}", url)))
    }
}

/// A complete recipe fixture with quantities and steps.
pub fn sample_recipe(title: &str) -> StructuredRecipe {
    let mut recipe = StructuredRecipe::new(title);
    recipe.ingredients = vec![
        Ingredient::new("lasagna noodles").with_quantity(Quantity::Number(12.0), None),
        Ingredient::new("ricotta").with_quantity(Quantity::Number(2.0), Some("cups")),
        Ingredient::new("salt").with_quantity(Quantity::Text("to taste".into()), None),
    ];
    recipe.instructions = vec![
        "Boil the noodles.".into(),
        "Layer noodles, ricotta and sauce.".into(),
        "Bake at 375F for 45 minutes.".into(),
    ];
    recipe.tags = vec!["italian".into(), "pasta".into()];
    recipe.servings = Some("8".into());
    recipe
}

/// A valid verdict carrying `recipe`.
pub fn valid_verdict(recipe: StructuredRecipe) -> JudgmentResponse {
    JudgmentResponse {
        is_valid_recipe: true,
        recipe_name: Some(recipe.title.clone()),
        recipe_data: Some(recipe),
        has_ingredients: true,
        has_instructions: true,
        reason: "Complete ingredient list and method".into(),
        confidence: 0.95,
        ..JudgmentResponse::degraded("")
    }
}

/// An invalid verdict pointing at `url`.
pub fn follow_up_verdict(url: &str, confidence: f32) -> JudgmentResponse {
    JudgmentResponse {
        follow_up_url: Some(url.to_string()),
        follow_up_confidence: confidence,
        reason: "Caption links to the full recipe".into(),
        confidence: 0.8,
        ..JudgmentResponse::degraded("")
    }
}

/// Builder for creating test scenarios.
pub struct TestScenario {
    source: MockContentSource,
    judge: MockJudge,
}

impl TestScenario {
    pub fn new() -> Self {
        Self {
            source: MockContentSource::new(),
            judge: MockJudge::new(),
        }
    }

    /// Serve `content` at `url` and judge it with `verdict`.
    pub fn with_page(mut self, url: &str, content: &str, verdict: JudgmentResponse) -> Self {
        self.source = self.source.with_page(url, content, "Web Page");
        self.judge = self.judge.with_response(url, verdict);
        self
    }

    /// Make `url` unreachable.
    pub fn with_unreachable(mut self, url: &str, error: &str) -> Self {
        self.source = self.source.with_failure(url, error);
        self
    }

    /// Get both mocks.
    pub fn build(self) -> (MockContentSource, MockJudge) {
        (self.source, self.judge)
    }
}

impl Default for TestScenario {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_judge_tracks_requests() {
        let judge = MockJudge::new().with_response(
            "https://example.com/lasagna",
            valid_verdict(sample_recipe("Lasagna")),
        );

        let verdict = judge
            .judge(&JudgmentRequest::new("text", "https://example.com/lasagna", 0))
            .await
            .unwrap();
        assert!(verdict.is_valid_recipe);

        // Unscripted URLs get a plain rejection
        let verdict = judge
            .judge(&JudgmentRequest::new("text", "https://example.com/about", 0))
            .await
            .unwrap();
        assert!(!verdict.is_valid_recipe);

        assert_eq!(judge.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_source_unknown_url_fails() {
        let source = MockContentSource::new().with_page("https://example.com/a", "text", "A");

        assert!(source.fetch("https://example.com/a").await.success);
        let missing = source.fetch("https://example.com/missing").await;
        assert!(!missing.success);
        assert!(missing.error.unwrap().contains("404"));
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_test_scenario() {
        let (source, judge) = TestScenario::new()
            .with_page(
                "https://example.com/lasagna",
                "Lasagna. 12 noodles...",
                valid_verdict(sample_recipe("Lasagna")),
            )
            .with_unreachable("https://example.com/down", "Request timed out")
            .build();

        let outcome = source.fetch("https://example.com/lasagna").await;
        assert!(outcome.content.contains("noodles"));
        assert!(!source.fetch("https://example.com/down").await.success);

        let verdict = judge
            .judge(&JudgmentRequest::new(outcome.content, "https://example.com/lasagna", 0))
            .await
            .unwrap();
        assert_eq!(verdict.recipe_name.as_deref(), Some("Lasagna"));
    }

    #[tokio::test]
    async fn test_mock_page_fetcher_unknown_url_is_404() {
        let fetcher = MockPageFetcher::new().with_page("https://example.com/a", "<p>hi</p>");

        assert_eq!(fetcher.fetch_html("https://example.com/a").await.unwrap(), "<p>hi</p>");
        let err = fetcher.fetch_html("https://example.com/b").await.unwrap_err();
        assert!(matches!(err, ExtractError::HttpStatus { status: 404, .. }));
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_stub_server_records_requests() {
        let server = StubServer::start(|request| {
            let status = if request.starts_with("GET /ok ") { 200 } else { 404 };
            Some(http_response(status, &[("Content-Type", "text/plain")], "hello"))
        })
        .await;

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let ok = client.get(server.url("/ok")).send().await.unwrap();
        assert_eq!(ok.status().as_u16(), 200);
        assert_eq!(ok.text().await.unwrap(), "hello");

        let missing = client
            .post(server.url("/missing"))
            .body("payload")
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        assert_eq!(server.hits(), 2);
        assert_eq!(server.hits_to("POST /missing"), 1);
        assert!(server.requests()[1].ends_with("payload"));
    }
}
