//! Turns accepted recipe fields into the caller-facing record.

use chrono::Utc;
use uuid::Uuid;

use crate::types::recipe::{PersistedRecipeRecord, StructuredRecipe};

/// Give `recipe` an identity and a timestamp.
///
/// Blank titles fall back to `fallback_title`, blank steps and ingredients are
/// dropped, and tags are deduplicated case-insensitively (first spelling wins).
pub fn assemble_record(
    recipe: StructuredRecipe,
    fallback_title: Option<&str>,
    source_url: Option<&str>,
) -> PersistedRecipeRecord {
    PersistedRecipeRecord {
        id: Uuid::new_v4(),
        recipe: tidy(recipe, fallback_title),
        created_at: Utc::now(),
        source_url: source_url.map(str::to_string),
    }
}

fn tidy(mut recipe: StructuredRecipe, fallback_title: Option<&str>) -> StructuredRecipe {
    recipe.title = recipe.title.trim().to_string();
    if recipe.title.is_empty() {
        recipe.title = fallback_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled Recipe")
            .to_string();
    }

    recipe.ingredients.retain(|i| !i.name.trim().is_empty());
    recipe.instructions = recipe
        .instructions
        .into_iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();

    let mut seen = std::collections::HashSet::new();
    recipe.tags = recipe
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect();

    recipe
}
