//! Bulk recipe import from a JSON seed document.
//!
//! ```json
//! { "recipes": [ {
//!     "title": "Pancakes",
//!     "servings": 4,
//!     "images": ["https://example.com/pancakes.jpg", "pancakes_hero"],
//!     "ingredients": [ { "name": "flour", "amount": "200g" } ],
//!     "ingredient_sections": [ { "header": "Topping", "ingredients": [ { "name": "syrup" } ] } ],
//!     "steps": [ "Whisk", "Fry" ]
//! } ] }
//! ```
//!
//! Image strings containing `://` are remote URLs, anything else names a
//! bundled asset.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{
    CookingStep, CookingStepSection, ImageSource, Ingredient, IngredientSection, Recipe,
};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    recipes: Vec<SeedRecipe>,
}

#[derive(Debug, Deserialize)]
struct SeedRecipe {
    id: Option<Uuid>,
    title: String,
    description: Option<String>,
    servings: Option<u32>,
    source_url: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    ingredients: Vec<SeedIngredient>,
    #[serde(default)]
    ingredient_sections: Vec<SeedIngredientSection>,
    #[serde(default)]
    steps: Vec<SeedStep>,
    #[serde(default)]
    step_sections: Vec<SeedStepSection>,
}

#[derive(Debug, Deserialize)]
struct SeedIngredient {
    name: String,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedIngredientSection {
    header: Option<String>,
    #[serde(default)]
    ingredients: Vec<SeedIngredient>,
}

/// A step is either bare instruction text or a full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedStep {
    Text(String),
    Full {
        step_number: Option<u32>,
        instruction: String,
        #[serde(default)]
        images: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct SeedStepSection {
    header: Option<String>,
    #[serde(default)]
    steps: Vec<SeedStep>,
}

fn image_from_seed(value: &str) -> Option<ImageSource> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.contains("://") {
        Some(ImageSource::Remote(value.to_string()))
    } else {
        Some(ImageSource::Bundled(value.to_string()))
    }
}

fn images_from_seed(values: &[String]) -> Vec<ImageSource> {
    values.iter().filter_map(|v| image_from_seed(v)).collect()
}

fn ingredients_from_seed(items: Vec<SeedIngredient>) -> Vec<Ingredient> {
    items
        .into_iter()
        .map(|i| Ingredient {
            name: i.name.trim().to_string(),
            amount: i
                .amount
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            is_modified: false,
        })
        .filter(|i| !i.name.is_empty())
        .collect()
}

// Steps without an explicit number continue from the previous one.
fn steps_from_seed(steps: Vec<SeedStep>) -> Vec<CookingStep> {
    let mut next = 1;
    steps
        .into_iter()
        .map(|step| {
            let (number, instruction, images) = match step {
                SeedStep::Text(text) => (None, text, Vec::new()),
                SeedStep::Full {
                    step_number,
                    instruction,
                    images,
                } => (step_number, instruction, images),
            };
            let step_number = number.unwrap_or(next);
            next = step_number.saturating_add(1);
            CookingStep {
                step_number,
                instruction,
                images: images_from_seed(&images),
                is_modified: false,
            }
        })
        .collect()
}

fn recipe_from_seed(seed: SeedRecipe, position: usize) -> Result<Recipe> {
    let title = seed.title.trim();
    if title.is_empty() {
        bail!("Recipe #{} has an empty title", position + 1);
    }

    let mut ingredient_sections = Vec::new();
    if !seed.ingredients.is_empty() {
        ingredient_sections.push(IngredientSection {
            header: None,
            ingredients: ingredients_from_seed(seed.ingredients),
        });
    }
    ingredient_sections.extend(seed.ingredient_sections.into_iter().map(|s| {
        IngredientSection {
            header: s.header,
            ingredients: ingredients_from_seed(s.ingredients),
        }
    }));

    let mut step_sections = Vec::new();
    if !seed.steps.is_empty() {
        step_sections.push(CookingStepSection {
            header: None,
            steps: steps_from_seed(seed.steps),
        });
    }
    step_sections.extend(seed.step_sections.into_iter().map(|s| CookingStepSection {
        header: s.header,
        steps: steps_from_seed(s.steps),
    }));

    let now = Utc::now();
    Ok(Recipe {
        id: seed.id.unwrap_or_else(Uuid::new_v4),
        title: title.to_string(),
        description: seed.description,
        servings: seed.servings,
        source_url: seed.source_url,
        images: images_from_seed(&seed.images),
        ingredient_sections,
        step_sections,
        created_at: now,
        updated_at: now,
    })
}

/// Parse a seed document into recipes, in document order.
pub fn parse_seed(input: &str) -> Result<Vec<Recipe>> {
    let file: SeedFile = serde_json::from_str(input).context("Invalid seed JSON")?;
    file.recipes
        .into_iter()
        .enumerate()
        .map(|(i, seed)| recipe_from_seed(seed, i))
        .collect()
}

pub fn load_seed_file(path: &Path) -> Result<Vec<Recipe>> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&input).with_context(|| format!("Failed to load seed file: {}", path.display()))
}
