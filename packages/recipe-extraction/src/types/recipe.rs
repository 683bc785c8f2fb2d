//! Structured recipe fields and the caller-facing persisted record.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingredient amount; models return either `2` or `"1/2"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Quantity::Number(n) => write!(f, "{}", n),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    pub name: String,
    pub quantity: Option<Quantity>,
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity, unit: Option<&str>) -> Self {
        self.quantity = Some(quantity);
        self.unit = unit.map(str::to_string);
        self
    }
}

/// Normalized recipe as produced by the judge or the generator. No identity yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StructuredRecipe {
    pub title: String,

    /// In the order they appear in the source.
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    /// One entry per step, without numbering.
    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub servings: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
    pub difficulty: Option<String>,
    pub cuisine: Option<String>,

    /// Tips, notes, storage advice and similar free text.
    pub additional_info: Option<Vec<String>>,
}

impl StructuredRecipe {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.is_empty()
    }

    pub fn has_instructions(&self) -> bool {
        !self.instructions.is_empty()
    }
}

/// A recipe that has been accepted and handed to the caller.
///
/// Created once when content is judged valid (or generated); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecipeRecord {
    pub id: Uuid,

    #[serde(flatten)]
    pub recipe: StructuredRecipe,

    pub created_at: DateTime<Utc>,

    /// URL of the page that yielded the valid judgment; absent for generated recipes.
    pub source_url: Option<String>,
}
