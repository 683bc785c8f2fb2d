//! Judgment step that never fails.

use tracing::{debug, warn};

use crate::traits::judge::RecipeJudge;
use crate::types::judgment::{JudgmentRequest, JudgmentResponse};

/// Ask `judge` for a verdict, degrading any failure to an invalid verdict
/// with confidence 0 and the failure in `reason`.
pub async fn judge_or_degrade<J>(judge: &J, request: &JudgmentRequest) -> JudgmentResponse
where
    J: RecipeJudge + ?Sized,
{
    match judge.judge(request).await {
        Ok(response) => {
            let response = response.normalized();
            debug!(
                url = %request.url,
                depth = request.depth,
                is_valid = response.is_valid_recipe,
                has_ingredients = response.has_ingredients,
                has_instructions = response.has_instructions,
                follow_up = ?response.follow_up_url,
                confidence = response.confidence,
                "Judgment received"
            );
            response
        }
        Err(e) => {
            warn!(url = %request.url, depth = request.depth, error = %e, "Judgment failed, degrading");
            JudgmentResponse::degraded(format!("Validation/formatting failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JudgeError;
    use crate::testing::MockJudge;

    #[tokio::test]
    async fn test_failure_degrades() {
        let judge = MockJudge::new().with_error_for("https://example.com", || JudgeError::Schema("missing field `reason`".into()));
        let request = JudgmentRequest::new("text", "https://example.com", 0);

        let response = judge_or_degrade(&judge, &request).await;
        assert!(!response.is_valid_recipe);
        assert_eq!(response.confidence, 0.0);
        assert!(response.reason.starts_with("Validation/formatting failed:"));
        assert!(response.reason.contains("missing field"));
    }

    #[tokio::test]
    async fn test_success_is_normalized() {
        let judge = MockJudge::new().with_response(
            "https://example.com",
            JudgmentResponse {
                follow_up_url: Some("https://example.com/recipes/x".into()),
                follow_up_confidence: 3.0,
                ..JudgmentResponse::degraded("teaser only")
            },
        );
        let request = JudgmentRequest::new("text", "https://example.com", 0);

        let response = judge_or_degrade(&judge, &request).await;
        assert_eq!(response.follow_up_confidence, 1.0);
        assert_eq!(judge.requests().len(), 1);
    }
}
