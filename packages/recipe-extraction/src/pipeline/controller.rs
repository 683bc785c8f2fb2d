//! Fetch, judge, and follow at most one discovered link.
//!
//! The recursion of the original design is an explicit loop over
//! `ATTEMPT(depth)` states, capped by [`MAX_FOLLOW_UP_DEPTH`].

use tracing::{debug, info};

use super::assemble::assemble_record;
use super::judge::judge_or_degrade;
use crate::traits::extractor::ContentSource;
use crate::traits::judge::RecipeJudge;
use crate::types::config::{PipelineConfig, MAX_FOLLOW_UP_DEPTH};
use crate::types::judgment::{JudgmentRequest, JudgmentResponse};
use crate::types::result::UnifiedResult;

/// What to do with an invalid verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUpDecision {
    /// Hop to this URL at the next depth.
    Follow(String),

    /// A candidate exists but the hop budget is spent.
    DepthExhausted,

    /// A candidate exists but the judge is not confident enough in it.
    LowConfidence(f32),

    /// Nothing to follow.
    NoCandidate,
}

impl FollowUpDecision {
    /// Failure text for a terminal decision.
    pub fn error_message(&self, threshold: f32) -> String {
        match self {
            FollowUpDecision::DepthExhausted => format!(
                "No valid recipe found and depth limit reached (max: {})",
                MAX_FOLLOW_UP_DEPTH
            ),
            FollowUpDecision::LowConfidence(confidence) => format!(
                "No valid recipe found and follow-up URL confidence too low ({:.2} < {})",
                confidence, threshold
            ),
            FollowUpDecision::NoCandidate | FollowUpDecision::Follow(_) => {
                "No valid recipe found".to_string()
            }
        }
    }
}

/// Decide whether an invalid verdict leads to a hop.
///
/// A hop happens iff a follow-up URL is present, its confidence is at least
/// `threshold`, and `depth` is below the cap. When a candidate exists the
/// depth check is reported before the confidence check.
pub fn decide_follow_up(judgment: &JudgmentResponse, depth: u8, threshold: f32) -> FollowUpDecision {
    let Some(url) = judgment.follow_up_url.as_deref() else {
        return FollowUpDecision::NoCandidate;
    };

    if depth >= MAX_FOLLOW_UP_DEPTH {
        FollowUpDecision::DepthExhausted
    } else if judgment.follow_up_confidence < threshold {
        FollowUpDecision::LowConfidence(judgment.follow_up_confidence)
    } else {
        FollowUpDecision::Follow(url.to_string())
    }
}

enum Step {
    Done(UnifiedResult),
    Follow(String),
}

/// The unified extraction pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let router = ExtractionRouter::from_config(&config)?;
/// let judge = OpenAI::new(config.require_openai()?.clone());
/// let extractor = RecipeExtractor::new(router, judge);
///
/// let result = extractor.extract_and_process("https://example.com/recipes/lasagna").await;
/// ```
pub struct RecipeExtractor<S, J> {
    source: S,
    judge: J,
    config: PipelineConfig,
}

impl<S, J> RecipeExtractor<S, J>
where
    S: ContentSource,
    J: RecipeJudge,
{
    pub fn new(source: S, judge: J) -> Self {
        Self {
            source,
            judge,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn judge(&self) -> &J {
        &self.judge
    }

    /// Extract a recipe from `url`, following at most one discovered link.
    ///
    /// Never fails: every error ends up in the returned result.
    pub async fn extract_and_process(&self, url: &str) -> UnifiedResult {
        let mut url = url.trim().to_string();
        let mut depth = 0u8;

        info!(url = %url, "Starting recipe extraction");

        loop {
            match self.attempt(&url, depth).await {
                Step::Done(result) => {
                    info!(
                        url = %result.extraction_url,
                        success = result.success,
                        status = ?result.status,
                        depth = result.extraction_depth,
                        "Recipe extraction finished"
                    );
                    return result;
                }
                Step::Follow(next) => {
                    info!(from = %url, to = %next, depth = depth + 1, "Following recipe link");
                    url = next;
                    depth += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &str, depth: u8) -> Step {
        let outcome = self.source.fetch(url).await;
        if !outcome.success {
            let error = outcome
                .error
                .unwrap_or_else(|| "Content extraction failed".to_string());
            return Step::Done(UnifiedResult::fetch_failed(url, depth, error));
        }

        debug!(url = %url, depth, title = %outcome.title, chars = outcome.content.len(), "Content fetched");

        let request = JudgmentRequest::new(self.config.prepare_content(&outcome.content), url, depth);
        let judgment = judge_or_degrade(&self.judge, &request).await;

        if judgment.is_valid_recipe {
            if let Some(recipe) = judgment.recipe_data.clone() {
                let record = assemble_record(recipe, judgment.recipe_name.as_deref(), Some(url));
                return Step::Done(UnifiedResult::recipe(url, depth, record, &judgment));
            }
            debug!(url = %url, "Judged valid without recipe data, treating as no recipe");
        }

        let threshold = self.config.follow_up_threshold;
        let decision = decide_follow_up(&judgment, depth, threshold);
        if let FollowUpDecision::Follow(next) = decision {
            return Step::Follow(next);
        }

        let partial_evidence = judgment.has_partial_evidence();
        let partial = judgment.partial_recipe_data.clone();
        let mut result = UnifiedResult::no_recipe(url, depth, decision.error_message(threshold), judgment);
        if partial_evidence {
            result = result.with_partial_evidence(outcome.content, partial);
        }

        Step::Done(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_follow_up(confidence: f32) -> JudgmentResponse {
        JudgmentResponse {
            follow_up_url: Some("https://example.com/recipes/lasagna".into()),
            follow_up_confidence: confidence,
            ..JudgmentResponse::degraded("link in caption")
        }
    }

    #[test]
    fn test_follow_when_confident_at_depth_zero() {
        assert_eq!(
            decide_follow_up(&with_follow_up(0.8), 0, 0.6),
            FollowUpDecision::Follow("https://example.com/recipes/lasagna".into())
        );
        // threshold is inclusive
        assert!(matches!(
            decide_follow_up(&with_follow_up(0.6), 0, 0.6),
            FollowUpDecision::Follow(_)
        ));
    }

    #[test]
    fn test_terminal_decisions() {
        assert_eq!(
            decide_follow_up(&with_follow_up(0.4), 0, 0.6),
            FollowUpDecision::LowConfidence(0.4)
        );
        assert_eq!(
            decide_follow_up(&with_follow_up(0.9), 1, 0.6),
            FollowUpDecision::DepthExhausted
        );
        // depth is reported first when both apply
        assert_eq!(
            decide_follow_up(&with_follow_up(0.1), 1, 0.6),
            FollowUpDecision::DepthExhausted
        );
        assert_eq!(
            decide_follow_up(&JudgmentResponse::degraded("nothing"), 0, 0.6),
            FollowUpDecision::NoCandidate
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FollowUpDecision::DepthExhausted.error_message(0.6),
            "No valid recipe found and depth limit reached (max: 1)"
        );
        assert_eq!(
            FollowUpDecision::LowConfidence(0.4).error_message(0.6),
            "No valid recipe found and follow-up URL confidence too low (0.40 < 0.6)"
        );
        assert_eq!(
            FollowUpDecision::NoCandidate.error_message(0.6),
            "No valid recipe found"
        );
    }
}
