//! Outcome shapes returned by the router and the controller.

use serde::{Deserialize, Serialize};

use super::judgment::JudgmentResponse;
use super::recipe::{PersistedRecipeRecord, StructuredRecipe};

/// Lightweight fetch result produced by the router. Never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionOutcome {
    pub content: String,
    pub title: String,
    pub success: bool,
    pub error: Option<String>,
}

impl ExtractionOutcome {
    pub fn ok(content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            title: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Three-way classification of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// A valid recipe was found and assembled.
    Recipe,

    /// Content was fetched but no valid recipe was found in it.
    NoRecipe,

    /// Content could not be fetched at all.
    FetchFailed,
}

/// Terminal output of `extract_and_process`, one per top-level call.
///
/// Every field is always serialized; optionals appear as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResult {
    pub success: bool,
    pub status: ExtractionStatus,
    pub recipe_json: Option<PersistedRecipeRecord>,
    pub recipe_name: Option<String>,

    /// URL of the final attempt (the follow-up URL if a hop occurred).
    pub extraction_url: String,

    pub is_valid_recipe: bool,
    pub has_ingredients: bool,
    pub has_instructions: bool,

    /// Follow-up candidate the pipeline did not take.
    pub follow_up_url: Option<String>,

    /// 0 for the original URL, 1 after one hop.
    pub extraction_depth: u8,

    pub error: Option<String>,
    pub confidence: f32,
    pub reason: String,

    /// Raw fetched text, only on failure with partial evidence.
    pub extracted_content: Option<String>,

    /// Partial structured fields, only on failure with partial evidence.
    pub partial_recipe_data: Option<StructuredRecipe>,
}

impl UnifiedResult {
    /// The URL could not be fetched or extracted.
    pub fn fetch_failed(url: impl Into<String>, depth: u8, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: ExtractionStatus::FetchFailed,
            recipe_json: None,
            recipe_name: None,
            extraction_url: url.into(),
            is_valid_recipe: false,
            has_ingredients: false,
            has_instructions: false,
            follow_up_url: None,
            extraction_depth: depth,
            error: Some(error.into()),
            confidence: 0.0,
            reason: "Content extraction failed".to_string(),
            extracted_content: None,
            partial_recipe_data: None,
        }
    }

    /// The judge accepted the content and the record has been assembled.
    pub fn recipe(
        url: impl Into<String>,
        depth: u8,
        record: PersistedRecipeRecord,
        judgment: &JudgmentResponse,
    ) -> Self {
        Self {
            success: true,
            status: ExtractionStatus::Recipe,
            recipe_name: judgment
                .recipe_name
                .clone()
                .or_else(|| Some(record.recipe.title.clone())),
            recipe_json: Some(record),
            extraction_url: url.into(),
            is_valid_recipe: true,
            has_ingredients: judgment.has_ingredients,
            has_instructions: judgment.has_instructions,
            follow_up_url: None,
            extraction_depth: depth,
            error: None,
            confidence: judgment.confidence,
            reason: judgment.reason.clone(),
            extracted_content: None,
            partial_recipe_data: None,
        }
    }

    /// Content was judged and rejected, with no hop left to take.
    pub fn no_recipe(
        url: impl Into<String>,
        depth: u8,
        error: impl Into<String>,
        judgment: JudgmentResponse,
    ) -> Self {
        Self {
            success: false,
            status: ExtractionStatus::NoRecipe,
            recipe_json: None,
            recipe_name: judgment.recipe_name,
            extraction_url: url.into(),
            is_valid_recipe: false,
            has_ingredients: judgment.has_ingredients,
            has_instructions: judgment.has_instructions,
            follow_up_url: judgment.follow_up_url,
            extraction_depth: depth,
            error: Some(error.into()),
            confidence: judgment.confidence,
            reason: judgment.reason,
            extracted_content: None,
            partial_recipe_data: None,
        }
    }

    /// Attach salvaged evidence so a caller can seed generation from it.
    pub fn with_partial_evidence(
        mut self,
        content: impl Into<String>,
        partial: Option<StructuredRecipe>,
    ) -> Self {
        self.extracted_content = Some(content.into());
        self.partial_recipe_data = partial;
        self
    }

    pub fn is_fetch_failure(&self) -> bool {
        self.status == ExtractionStatus::FetchFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_serializes_every_field() {
        let result = UnifiedResult::fetch_failed("https://example.com", 0, "HTTP 404 error");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "fetch_failed");
        assert_eq!(json["reason"], "Content extraction failed");
        for key in [
            "recipe_json",
            "recipe_name",
            "follow_up_url",
            "extracted_content",
            "partial_recipe_data",
        ] {
            assert!(json.get(key).is_some_and(|v| v.is_null()), "{key} missing");
        }
        assert_eq!(json["is_valid_recipe"], false);
        assert_eq!(json["extraction_depth"], 0);
    }

    #[test]
    fn test_no_recipe_keeps_follow_up_for_inspection() {
        let judgment = JudgmentResponse {
            follow_up_url: Some("https://example.com/recipes/x".into()),
            follow_up_confidence: 0.4,
            ..JudgmentResponse::degraded("only a teaser")
        };
        let result = UnifiedResult::no_recipe("https://example.com", 0, "No valid recipe found", judgment);

        assert_eq!(result.status, ExtractionStatus::NoRecipe);
        assert_eq!(result.follow_up_url.as_deref(), Some("https://example.com/recipes/x"));
        assert!(!result.is_fetch_failure());
    }
}
