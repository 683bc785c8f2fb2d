//! Request/response contract of the recipe judge.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::recipe::StructuredRecipe;

/// One judgment per recursion level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgmentRequest {
    /// Extracted text, untruncated unless the pipeline is configured otherwise.
    pub content: String,

    /// URL the content came from.
    pub url: String,

    /// Hops taken so far. Informs the judge; the controller enforces the cap.
    pub depth: u8,
}

impl JudgmentRequest {
    pub fn new(content: impl Into<String>, url: impl Into<String>, depth: u8) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
            depth,
        }
    }
}

/// Verdict on whether content is a complete recipe, plus what to do next if not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JudgmentResponse {
    /// True only if the content has BOTH an ingredient list with quantities AND step-by-step instructions
    pub is_valid_recipe: bool,

    /// Complete structured recipe. Only when is_valid_recipe is true, else null
    pub recipe_data: Option<StructuredRecipe>,

    /// Whatever ingredients/instructions were found when the recipe is incomplete, else null
    pub partial_recipe_data: Option<StructuredRecipe>,

    /// Recipe name or dish name, if identifiable
    pub recipe_name: Option<String>,

    /// Whether an ingredient list with quantities exists
    pub has_ingredients: bool,

    /// Whether step-by-step instructions exist
    pub has_instructions: bool,

    /// URL found in the content most likely to hold the recipe. Only when is_valid_recipe is false, else null
    pub follow_up_url: Option<String>,

    /// Confidence in follow_up_url, 0.0 to 1.0
    pub follow_up_confidence: f32,

    /// Explanation of the decision
    pub reason: String,

    /// Overall confidence, 0.0 to 1.0
    pub confidence: f32,
}

impl JudgmentResponse {
    /// Canned invalid verdict used when the judge itself fails.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            is_valid_recipe: false,
            recipe_data: None,
            partial_recipe_data: None,
            recipe_name: None,
            has_ingredients: false,
            has_instructions: false,
            follow_up_url: None,
            follow_up_confidence: 0.0,
            reason: reason.into(),
            confidence: 0.0,
        }
    }

    /// Enforce the contract invariants on a response from an untrusted model.
    ///
    /// Scores are clamped into `[0, 1]` (NaN becomes 0), `recipe_data` only
    /// survives a valid verdict, and a follow-up only survives an invalid one.
    pub fn normalized(mut self) -> Self {
        self.confidence = clamp_unit(self.confidence);
        self.follow_up_confidence = clamp_unit(self.follow_up_confidence);

        self.follow_up_url = self
            .follow_up_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self.recipe_name = self
            .recipe_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if self.is_valid_recipe {
            self.follow_up_url = None;
            self.follow_up_confidence = 0.0;
            self.partial_recipe_data = None;
            if self.recipe_name.is_none() {
                self.recipe_name = self
                    .recipe_data
                    .as_ref()
                    .map(|r| r.title.trim().to_string())
                    .filter(|t| !t.is_empty());
            }
        } else {
            self.recipe_data = None;
        }

        self
    }

    /// Some ingredient or instruction evidence was found.
    pub fn has_partial_evidence(&self) -> bool {
        self.has_ingredients || self.has_instructions
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
