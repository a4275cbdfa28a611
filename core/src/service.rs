use std::path::Path;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::{CategoryIndex, Recipe, RecipeCategory, ShoppingListDto};

/// Async facade over one [`Database`].
///
/// Every call holds the store lock for its whole duration, so writes from
/// concurrent callers are applied one at a time. Nothing is spawned; the SQLite
/// work runs on the caller's task once the lock is acquired.
pub struct BasketService {
    db: Mutex<Database>,
}

impl BasketService {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    // --- Recipes ---

    pub async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.db.lock().await.save_recipe(recipe)
    }

    pub async fn load_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        self.db.lock().await.get_recipe(id)
    }

    pub async fn load_all_recipes(&self) -> Result<Vec<Recipe>> {
        self.db.lock().await.list_recipes()
    }

    pub async fn delete_recipe(&self, id: Uuid) -> Result<()> {
        self.db.lock().await.delete_recipe(id)
    }

    // --- Categories ---

    pub async fn create_category(&self, name: &str) -> Result<RecipeCategory> {
        self.db.lock().await.create_category(name)
    }

    pub async fn rename_category(&self, id: Uuid, new_name: &str) -> Result<RecipeCategory> {
        self.db.lock().await.rename_category(id, new_name)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        self.db.lock().await.delete_category(id)
    }

    pub async fn add_recipe_to_category(&self, recipe_id: Uuid, category_id: Uuid) -> Result<()> {
        self.db
            .lock()
            .await
            .add_recipe_to_category(recipe_id, category_id)
    }

    pub async fn remove_recipe_from_category(
        &self,
        recipe_id: Uuid,
        category_id: Uuid,
    ) -> Result<()> {
        self.db
            .lock()
            .await
            .remove_recipe_from_category(recipe_id, category_id)
    }

    pub async fn load_all_categories(&self) -> Result<CategoryIndex> {
        self.db.lock().await.load_all_categories()
    }

    // --- Shopping lists ---

    pub async fn create_shopping_list(
        &self,
        name: &str,
        recipe_ids: &[Uuid],
    ) -> Result<ShoppingListDto> {
        self.db.lock().await.create_shopping_list(name, recipe_ids)
    }

    pub async fn load_shopping_list(&self, id: Uuid) -> Result<Option<ShoppingListDto>> {
        self.db.lock().await.get_shopping_list(id)
    }

    pub async fn load_all_shopping_lists(&self) -> Result<Vec<ShoppingListDto>> {
        self.db.lock().await.list_shopping_lists()
    }

    pub async fn delete_shopping_list(&self, id: Uuid) -> Result<()> {
        self.db.lock().await.delete_shopping_list(id)
    }

    pub async fn update_shopping_item_checked(&self, item_id: Uuid, is_checked: bool) -> Result<()> {
        self.db.lock().await.set_item_checked(item_id, is_checked)
    }

    pub async fn update_shopping_item_category(
        &self,
        item_id: Uuid,
        category: Option<&str>,
    ) -> Result<()> {
        self.db.lock().await.set_item_category(item_id, category)
    }

    pub async fn rename_shopping_list(&self, id: Uuid, name: &str) -> Result<ShoppingListDto> {
        self.db.lock().await.rename_shopping_list(id, name)
    }

    // --- Reset ---

    pub async fn delete_all_data(&self) -> Result<()> {
        self.db.lock().await.delete_all_data()
    }
}
