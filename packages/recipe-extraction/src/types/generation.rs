//! Types for the generate-from-knowledge fallback.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::recipe::{PersistedRecipeRecord, StructuredRecipe};
use super::result::UnifiedResult;

/// What the generator is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub recipe_name: String,

    /// Raw text salvaged from a failed extraction.
    pub partial_content: Option<String>,

    /// Structured fragments salvaged from a failed extraction.
    pub partial_recipe: Option<StructuredRecipe>,
}

impl GenerationRequest {
    pub fn new(recipe_name: impl Into<String>) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            partial_content: None,
            partial_recipe: None,
        }
    }

    pub fn with_partial_content(mut self, content: impl Into<String>) -> Self {
        self.partial_content = Some(content.into());
        self
    }

    pub fn with_partial_recipe(mut self, recipe: StructuredRecipe) -> Self {
        self.partial_recipe = Some(recipe);
        self
    }

    /// Seed a request from a failed extraction, carrying its evidence back in.
    ///
    /// Returns `None` for successful results and when no dish name can be
    /// recovered from either the judgment or the partial fields.
    pub fn from_failed(result: &UnifiedResult) -> Option<Self> {
        if result.success {
            return None;
        }

        let name = result
            .recipe_name
            .clone()
            .or_else(|| result.partial_recipe_data.as_ref().map(|p| p.title.clone()))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())?;

        Some(Self {
            recipe_name: name,
            partial_content: result.extracted_content.clone(),
            partial_recipe: result.partial_recipe_data.clone(),
        })
    }

    pub fn has_partial_evidence(&self) -> bool {
        self.partial_content.is_some() || self.partial_recipe.is_some()
    }
}

/// Where a generated recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    #[default]
    Knowledge,
}

/// Outcome of `generate_from_knowledge`. Never raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipeResult {
    pub success: bool,
    pub recipe_json: Option<PersistedRecipeRecord>,
    pub recipe_name: String,
    pub source: RecipeSource,
    pub error: Option<String>,
}

/// How sure the name extractor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NameConfidence {
    High,
    Medium,
    Low,
}

/// Dish name pulled out of a free-text request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecipeNameExtraction {
    /// Title-cased dish name, or null if none can be identified
    pub recipe_name: Option<String>,

    /// high: clear recipe request; medium: food name present but unclear; low: no dish found
    pub confidence: NameConfidence,

    /// Explanation of the extraction decision
    pub reason: String,
}

impl RecipeNameExtraction {
    pub fn low(reason: impl Into<String>) -> Self {
        Self {
            recipe_name: None,
            confidence: NameConfidence::Low,
            reason: reason.into(),
        }
    }
}
