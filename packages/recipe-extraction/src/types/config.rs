//! Tunables for the pipeline and the fetcher.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Hard cap on follow-up hops. Not configurable at runtime.
pub const MAX_FOLLOW_UP_DEPTH: u8 = 1;

/// Minimum follow-up confidence required to take a hop.
pub const DEFAULT_FOLLOW_UP_THRESHOLD: f32 = 0.6;

/// Browser identity sent with generic page fetches.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Per-request timeout for page fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the recursive controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Follow-up URLs below this confidence are reported but not followed.
    ///
    /// Default: 0.6.
    pub follow_up_threshold: f32,

    /// Truncate content to this many characters before judging.
    ///
    /// Default: `None` (send everything).
    pub max_content_chars: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            follow_up_threshold: DEFAULT_FOLLOW_UP_THRESHOLD,
            max_content_chars: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_follow_up_threshold(mut self, threshold: f32) -> Self {
        self.follow_up_threshold = threshold;
        self
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = Some(max);
        self
    }

    /// Apply `max_content_chars` on a char boundary.
    pub fn prepare_content(&self, content: &str) -> String {
        match self.max_content_chars {
            Some(max) => content.chars().take(max).collect(),
            None => content.to_string(),
        }
    }
}

/// Configuration for outbound page fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.follow_up_threshold, 0.6);
        assert!(pipeline.max_content_chars.is_none());

        let fetch = FetchConfig::default();
        assert_eq!(fetch.timeout, Duration::from_secs(10));
        assert_eq!(fetch.retry.max_attempts, 3);
        assert!(fetch.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_prepare_content_respects_char_boundaries() {
        let config = PipelineConfig::new().with_max_content_chars(3);
        assert_eq!(config.prepare_content("crème brûlée"), "crè");

        let config = PipelineConfig::new();
        assert_eq!(config.prepare_content("crème brûlée"), "crème brûlée");
    }
}
