//! Structured-output model capabilities: judging and generating recipes.

use async_trait::async_trait;

use crate::error::JudgeResult;
use crate::types::generation::{GenerationRequest, RecipeNameExtraction};
use crate::types::judgment::{JudgmentRequest, JudgmentResponse};
use crate::types::recipe::StructuredRecipe;

/// Decides whether content is a complete recipe.
///
/// Implementations may fail; the pipeline wraps calls in
/// [`judge_or_degrade`](crate::pipeline::judge_or_degrade) so failures never escape.
#[async_trait]
pub trait RecipeJudge: Send + Sync {
    async fn judge(&self, request: &JudgmentRequest) -> JudgeResult<JudgmentResponse>;
}

/// Produces recipes from background knowledge.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Generate a full recipe, using any partial evidence in the request.
    async fn generate(&self, request: &GenerationRequest) -> JudgeResult<StructuredRecipe>;

    /// Pull a dish name out of a free-text request.
    async fn extract_recipe_name(&self, text: &str) -> JudgeResult<RecipeNameExtraction>;
}
