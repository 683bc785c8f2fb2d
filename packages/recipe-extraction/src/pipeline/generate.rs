//! Generate-from-knowledge fallback and dish-name extraction.

use tracing::{info, warn};

use super::assemble::assemble_record;
use crate::traits::judge::RecipeGenerator;
use crate::types::generation::{
    GeneratedRecipeResult, GenerationRequest, RecipeNameExtraction, RecipeSource,
};

/// Produce a recipe from the model's own knowledge, seeded with any evidence
/// salvaged from a failed extraction.
///
/// Never fails: errors and incomplete recipes come back with `success = false`.
pub async fn generate_from_knowledge<G>(generator: &G, request: &GenerationRequest) -> GeneratedRecipeResult
where
    G: RecipeGenerator + ?Sized,
{
    let recipe_name = request.recipe_name.trim().to_string();

    if recipe_name.is_empty() {
        return GeneratedRecipeResult {
            success: false,
            recipe_json: None,
            recipe_name,
            source: RecipeSource::Knowledge,
            error: Some("Failed to generate recipe: recipe name is empty".to_string()),
        };
    }

    info!(
        recipe_name = %recipe_name,
        seeded = request.has_partial_evidence(),
        "Generating recipe from knowledge"
    );

    let error = match generator.generate(request).await {
        Ok(recipe) if recipe.has_ingredients() && recipe.has_instructions() => {
            let record = assemble_record(recipe, Some(&recipe_name), None);
            return GeneratedRecipeResult {
                success: true,
                recipe_name: record.recipe.title.clone(),
                recipe_json: Some(record),
                source: RecipeSource::Knowledge,
                error: None,
            };
        }
        Ok(_) => "Failed to generate recipe: generated recipe is missing ingredients or instructions".to_string(),
        Err(e) => format!("Failed to generate recipe: {}", e),
    };

    warn!(recipe_name = %recipe_name, error = %error, "Recipe generation failed");

    GeneratedRecipeResult {
        success: false,
        recipe_json: None,
        recipe_name,
        source: RecipeSource::Knowledge,
        error: Some(error),
    }
}

/// Pull a dish name out of free text, degrading failures to a
/// low-confidence answer with no name.
pub async fn extract_name_or_degrade<G>(generator: &G, text: &str) -> RecipeNameExtraction
where
    G: RecipeGenerator + ?Sized,
{
    match generator.extract_recipe_name(text).await {
        Ok(mut extraction) => {
            extraction.recipe_name = extraction
                .recipe_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            extraction
        }
        Err(e) => {
            warn!(error = %e, "Recipe name extraction failed");
            RecipeNameExtraction::low(format!("Extraction failed: {}", e))
        }
    }
}
