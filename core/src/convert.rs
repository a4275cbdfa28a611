//! Mapping between domain [`Recipe`] values and the flat rows stored by
//! [`Database`](crate::db::Database).
//!
//! Both directions are pure. Ordered collections become rows with an explicit
//! `sort_order`; transient image sources are dropped on the way in and
//! unparseable image references are skipped on the way out.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    CookingStep, CookingStepSection, ImageSource, Ingredient, IngredientSection, Recipe,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<u32>,
    pub source_url: Option<String>,
    pub image_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientSectionRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub header: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRecord {
    pub id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub amount: Option<String>,
    pub is_modified: bool,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSectionRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub header: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub id: Uuid,
    pub section_id: Uuid,
    pub step_number: u32,
    pub instruction: String,
    pub image_refs: Vec<String>,
    pub is_modified: bool,
    pub sort_order: i64,
}

/// Every row belonging to one recipe aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecords {
    pub recipe: RecipeRecord,
    pub ingredient_sections: Vec<IngredientSectionRecord>,
    pub ingredients: Vec<IngredientRecord>,
    pub step_sections: Vec<StepSectionRecord>,
    pub steps: Vec<StepRecord>,
}

#[allow(clippy::cast_possible_wrap)]
fn sort_key(index: usize) -> i64 {
    index as i64
}

fn image_refs(images: &[ImageSource]) -> Vec<String> {
    images.iter().filter_map(ImageSource::to_reference).collect()
}

fn images_from_refs(refs: &[String]) -> Vec<ImageSource> {
    refs.iter()
        .filter_map(|r| {
            let source = ImageSource::from_reference(r);
            if source.is_none() {
                warn!(reference = %r, "skipping unparseable image reference");
            }
            source
        })
        .collect()
}

/// Flatten a recipe into rows. Section and child rows get fresh ids; the
/// recipe row keeps the recipe's own id.
#[must_use]
pub fn recipe_to_records(recipe: &Recipe) -> RecipeRecords {
    let mut ingredient_sections = Vec::with_capacity(recipe.ingredient_sections.len());
    let mut ingredients = Vec::new();
    for (section_idx, section) in recipe.ingredient_sections.iter().enumerate() {
        let section_id = Uuid::new_v4();
        ingredient_sections.push(IngredientSectionRecord {
            id: section_id,
            recipe_id: recipe.id,
            header: section.header.clone(),
            sort_order: sort_key(section_idx),
        });
        ingredients.extend(section.ingredients.iter().enumerate().map(|(idx, ing)| {
            IngredientRecord {
                id: Uuid::new_v4(),
                section_id,
                name: ing.name.clone(),
                amount: ing.amount.clone(),
                is_modified: ing.is_modified,
                sort_order: sort_key(idx),
            }
        }));
    }

    let mut step_sections = Vec::with_capacity(recipe.step_sections.len());
    let mut steps = Vec::new();
    for (section_idx, section) in recipe.step_sections.iter().enumerate() {
        let section_id = Uuid::new_v4();
        step_sections.push(StepSectionRecord {
            id: section_id,
            recipe_id: recipe.id,
            header: section.header.clone(),
            sort_order: sort_key(section_idx),
        });
        steps.extend(
            section
                .steps
                .iter()
                .enumerate()
                .map(|(idx, step)| StepRecord {
                    id: Uuid::new_v4(),
                    section_id,
                    step_number: step.step_number,
                    instruction: step.instruction.clone(),
                    image_refs: image_refs(&step.images),
                    is_modified: step.is_modified,
                    sort_order: sort_key(idx),
                }),
        );
    }

    RecipeRecords {
        recipe: RecipeRecord {
            id: recipe.id,
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            servings: recipe.servings,
            source_url: recipe.source_url.clone(),
            image_refs: image_refs(&recipe.images),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        },
        ingredient_sections,
        ingredients,
        step_sections,
        steps,
    }
}

/// Rebuild a recipe from its rows. Row order in the input does not matter;
/// `sort_order` decides. Child rows pointing at an unknown section are ignored.
#[must_use]
pub fn recipe_from_records(records: RecipeRecords) -> Recipe {
    let RecipeRecords {
        recipe,
        mut ingredient_sections,
        mut ingredients,
        mut step_sections,
        mut steps,
    } = records;

    ingredient_sections.sort_by_key(|s| s.sort_order);
    ingredients.sort_by_key(|i| i.sort_order);
    step_sections.sort_by_key(|s| s.sort_order);
    steps.sort_by_key(|s| s.sort_order);

    let ingredient_sections = ingredient_sections
        .into_iter()
        .map(|section| IngredientSection {
            ingredients: ingredients
                .iter()
                .filter(|i| i.section_id == section.id)
                .map(|i| Ingredient {
                    name: i.name.clone(),
                    amount: i.amount.clone(),
                    is_modified: i.is_modified,
                })
                .collect(),
            header: section.header,
        })
        .collect();

    let step_sections = step_sections
        .into_iter()
        .map(|section| CookingStepSection {
            steps: steps
                .iter()
                .filter(|s| s.section_id == section.id)
                .map(|s| CookingStep {
                    step_number: s.step_number,
                    instruction: s.instruction.clone(),
                    images: images_from_refs(&s.image_refs),
                    is_modified: s.is_modified,
                })
                .collect(),
            header: section.header,
        })
        .collect();

    Recipe {
        id: recipe.id,
        title: recipe.title,
        description: recipe.description,
        servings: recipe.servings,
        source_url: recipe.source_url,
        images: images_from_refs(&recipe.image_refs),
        ingredient_sections,
        step_sections,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}
