use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BasketError, Result};

// --- Recipes ---

/// Where an image for a recipe or a cooking step comes from.
///
/// Only `Remote` and `Bundled` sources survive persistence; bitmaps and local
/// file references are transient and are dropped on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Remote(String),
    Bundled(String),
    Bitmap(Vec<u8>),
    LocalFile(PathBuf),
}

const REMOTE_PREFIX: &str = "remote:";
const BUNDLED_PREFIX: &str = "bundled:";

fn is_valid_remote(url: &str) -> bool {
    url == url.trim() && url.contains("://")
}

fn is_valid_bundled(name: &str) -> bool {
    !name.is_empty() && name == name.trim()
}

impl ImageSource {
    /// Whether this source survives a save. Remote URLs must carry a scheme
    /// and bundled names must be non-empty; neither may have surrounding
    /// whitespace.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        match self {
            Self::Remote(url) => is_valid_remote(url),
            Self::Bundled(name) => is_valid_bundled(name),
            Self::Bitmap(_) | Self::LocalFile(_) => false,
        }
    }

    /// Stored reference string, or `None` when the source is not persistable.
    #[must_use]
    pub fn to_reference(&self) -> Option<String> {
        if !self.is_persistable() {
            return None;
        }
        match self {
            Self::Remote(url) => Some(format!("{REMOTE_PREFIX}{url}")),
            Self::Bundled(name) => Some(format!("{BUNDLED_PREFIX}{name}")),
            Self::Bitmap(_) | Self::LocalFile(_) => None,
        }
    }

    /// Parse a stored reference. Accepts exactly what [`Self::to_reference`]
    /// produces; anything else yields `None`.
    #[must_use]
    pub fn from_reference(reference: &str) -> Option<Self> {
        if let Some(url) = reference.strip_prefix(REMOTE_PREFIX) {
            return is_valid_remote(url).then(|| Self::Remote(url.to_string()));
        }
        if let Some(name) = reference.strip_prefix(BUNDLED_PREFIX) {
            return is_valid_bundled(name).then(|| Self::Bundled(name.to_string()));
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: Option<String>,
    #[serde(default)]
    pub is_modified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSection {
    pub header: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingStep {
    pub step_number: u32,
    pub instruction: String,
    #[serde(default)]
    pub images: Vec<ImageSource>,
    #[serde(default)]
    pub is_modified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingStepSection {
    pub header: Option<String>,
    pub steps: Vec<CookingStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<u32>,
    pub source_url: Option<String>,
    pub images: Vec<ImageSource>,
    pub ingredient_sections: Vec<IngredientSection>,
    pub step_sections: Vec<CookingStepSection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// An empty recipe with a fresh id and both timestamps set to now.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            servings: None,
            source_url: None,
            images: Vec::new(),
            ingredient_sections: Vec::new(),
            step_sections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// All ingredients across sections, in display order.
    pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredient_sections
            .iter()
            .flat_map(|section| section.ingredients.iter())
    }

    /// Copy of this recipe with transient image sources removed, i.e. what a
    /// save followed by a load hands back.
    #[must_use]
    pub fn persisted_view(&self) -> Self {
        let mut recipe = self.clone();
        recipe.images.retain(ImageSource::is_persistable);
        for section in &mut recipe.step_sections {
            for step in &mut section.steps {
                step.images.retain(ImageSource::is_persistable);
            }
        }
        recipe
    }
}

// --- Categories ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCategory {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Every category plus the recipes tagged with it.
///
/// `recipes_by_category` holds an entry for every category, empty or not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryIndex {
    pub categories: Vec<RecipeCategory>,
    pub recipes_by_category: HashMap<Uuid, HashSet<Uuid>>,
}

impl CategoryIndex {
    #[must_use]
    pub fn recipes_in(&self, category_id: Uuid) -> Option<&HashSet<Uuid>> {
        self.recipes_by_category.get(&category_id)
    }

    /// Categories that tag the given recipe, in category order.
    #[must_use]
    pub fn categories_of(&self, recipe_id: Uuid) -> Vec<&RecipeCategory> {
        self.categories
            .iter()
            .filter(|c| {
                self.recipes_by_category
                    .get(&c.id)
                    .is_some_and(|ids| ids.contains(&recipe_id))
            })
            .collect()
    }
}

/// Trim a category name and reject blank input.
pub fn validate_category_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BasketError::InvalidCategoryName);
    }
    Ok(trimmed.to_string())
}

// --- Shopping lists ---

/// Trim a shopping-list name and reject blank input.
pub fn validate_list_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BasketError::InvalidShoppingListName);
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItemBreakdownDto {
    pub id: Uuid,
    pub amount: Option<String>,
    pub source_recipe_id: Uuid,
    /// Title of the source recipe when the list was built. Never refreshed.
    pub source_recipe_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItemDto {
    pub id: Uuid,
    pub name: String,
    pub total_amount: Option<String>,
    pub category: Option<String>,
    pub is_checked: bool,
    pub breakdowns: Vec<ShoppingListItemBreakdownDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Contributing recipes that still exist, in the order they were given.
    pub recipe_ids: Vec<Uuid>,
    pub items: Vec<ShoppingListItemDto>,
}

impl ShoppingListDto {
    #[must_use]
    pub fn item(&self, item_id: Uuid) -> Option<&ShoppingListItemDto> {
        self.items.iter().find(|i| i.id == item_id)
    }

    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_checked).count()
    }
}
